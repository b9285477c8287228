//! Schema construction helpers
//!
//! Classes, features, operations, packages and enums are created by
//! instantiating meta-classes and assigning their features through the
//! ordinary reflective path; these helpers only bundle the usual steps.

use std::collections::BTreeMap;

use crate::defaults::UNBOUNDED;
use crate::meta::DataTypeBinding;
use crate::value::{CollectionRef, ObjectId, PrimitiveKind, Value};
use crate::{MopResult, Runtime};

/// Kind of structural feature to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureShape {
    /// Data-valued feature
    Attribute,
    /// Object-valued feature
    Reference {
        /// Whether referenced objects are owned by the referrer
        containment: bool,
    },
}

/// Definition for a structural feature to be added to a class
#[derive(Debug, Clone)]
pub struct FeatureDefinition {
    /// Feature name
    pub name: String,
    /// Attribute or reference
    pub shape: FeatureShape,
    /// Declared classifier
    pub ty: ObjectId,
    /// Lower bound
    pub lower: i64,
    /// Upper bound (negative for unbounded)
    pub upper: i64,
    /// Ordered collection
    pub ordered: bool,
    /// Unique collection
    pub unique: bool,
    /// Changeable through the public path
    pub changeable: bool,
    /// Derived
    pub derived: bool,
    /// Transient
    pub transient: bool,
    /// Volatile
    pub volatile: bool,
    /// Unsettable
    pub unsettable: bool,
    /// Identifier attribute
    pub id: bool,
    /// Opposite reference
    pub opposite: Option<ObjectId>,
    /// Explicit default value
    pub default_value: Option<Value>,
    /// Default value literal, converted through the type
    pub default_literal: Option<String>,
}

impl FeatureDefinition {
    fn new(name: impl Into<String>, shape: FeatureShape, ty: ObjectId) -> Self {
        Self {
            name: name.into(),
            shape,
            ty,
            lower: 0,
            upper: 1,
            ordered: true,
            unique: true,
            changeable: true,
            derived: false,
            transient: false,
            volatile: false,
            unsettable: false,
            id: false,
            opposite: None,
            default_value: None,
            default_literal: None,
        }
    }

    /// Attribute typed by a data type or enum
    pub fn attribute(name: impl Into<String>, ty: ObjectId) -> Self {
        Self::new(name, FeatureShape::Attribute, ty)
    }

    /// Non-containment reference typed by a class
    pub fn reference(name: impl Into<String>, ty: ObjectId) -> Self {
        Self::new(name, FeatureShape::Reference { containment: false }, ty)
    }

    /// Containment reference typed by a class
    pub fn containment(name: impl Into<String>, ty: ObjectId) -> Self {
        Self::new(name, FeatureShape::Reference { containment: true }, ty)
    }

    /// Make multi-valued and unbounded
    pub fn many(mut self) -> Self {
        self.upper = UNBOUNDED;
        self
    }

    /// Set both bounds
    pub fn bounds(mut self, lower: i64, upper: i64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Require at least one value
    pub fn required(mut self) -> Self {
        self.lower = self.lower.max(1);
        self
    }

    /// Set the `ordered` flag
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Set the `unique` flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the `changeable` flag
    pub fn changeable(mut self, changeable: bool) -> Self {
        self.changeable = changeable;
        self
    }

    /// Mark as derived
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Mark as transient
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Mark as volatile
    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    /// Mark as unsettable
    pub fn unsettable(mut self) -> Self {
        self.unsettable = true;
        self
    }

    /// Mark as the identifier attribute
    pub fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Pair with an existing opposite reference
    pub fn opposite(mut self, opposite: ObjectId) -> Self {
        self.opposite = Some(opposite);
        self
    }

    /// Set the explicit default value
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set the default literal
    pub fn default_literal(mut self, literal: impl Into<String>) -> Self {
        self.default_literal = Some(literal.into());
        self
    }
}

/// Parameter definition for operation signatures
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: String,
    /// Declared classifier
    pub ty: ObjectId,
    /// Whether an argument must be supplied
    pub required: bool,
}

impl ParameterDefinition {
    /// Required parameter
    pub fn new(name: impl Into<String>, ty: ObjectId) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    /// Optional parameter
    pub fn optional(name: impl Into<String>, ty: ObjectId) -> Self {
        Self {
            required: false,
            ..Self::new(name, ty)
        }
    }
}

/// Definition for an operation to be added to a class
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    /// Operation name
    pub name: String,
    /// Return type (`None` for no result)
    pub returns: Option<ObjectId>,
    /// Parameters in order
    pub parameters: Vec<ParameterDefinition>,
    /// Declared exception classifiers
    pub exceptions: Vec<ObjectId>,
}

impl OperationDefinition {
    /// Create an operation with no parameters and no result
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returns: None,
            parameters: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    /// Set the return type
    pub fn returns(mut self, ty: ObjectId) -> Self {
        self.returns = Some(ty);
        self
    }

    /// Add a parameter
    pub fn with_param(mut self, param: ParameterDefinition) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a declared exception
    pub fn raises(mut self, exception: ObjectId) -> Self {
        self.exceptions.push(exception);
        self
    }
}

impl Runtime {
    /// Create a concrete class with no supertypes
    pub fn create_class(&mut self, name: &str) -> MopResult<ObjectId> {
        let class = self.instantiate(self.meta.e_class)?;
        self.set(class, self.meta.named_element_name, name)?;
        Ok(class)
    }

    /// Create a class with the given direct supertypes
    pub fn create_subclass(&mut self, name: &str, super_types: &[ObjectId]) -> MopResult<ObjectId> {
        let class = self.create_class(name)?;
        let supers = CollectionRef {
            owner: class,
            feature: self.meta.class_super_types,
        };
        self.add_all(supers, super_types.iter().copied())?;
        Ok(class)
    }

    /// Add a structural feature to a class
    pub fn define_feature(&mut self, class: ObjectId, def: FeatureDefinition) -> MopResult<ObjectId> {
        let m = self.meta;
        let meta_class = match def.shape {
            FeatureShape::Attribute => m.e_attribute,
            FeatureShape::Reference { .. } => m.e_reference,
        };
        let feature = self.instantiate(meta_class)?;
        self.set(feature, m.named_element_name, def.name.as_str())?;
        self.set(feature, m.typed_element_type, def.ty)?;
        if def.lower != 0 {
            self.set(feature, m.typed_element_lower_bound, def.lower)?;
        }
        if def.upper != 1 {
            self.set(feature, m.typed_element_upper_bound, def.upper)?;
        }
        if !def.ordered {
            self.set(feature, m.typed_element_ordered, false)?;
        }
        if !def.unique {
            self.set(feature, m.typed_element_unique, false)?;
        }
        if !def.changeable {
            self.set(feature, m.feature_changeable, false)?;
        }
        for (flag, meta_feature) in [
            (def.derived, m.feature_derived),
            (def.transient, m.feature_transient),
            (def.volatile, m.feature_volatile),
            (def.unsettable, m.feature_unsettable),
        ] {
            if flag {
                self.set(feature, meta_feature, true)?;
            }
        }
        match def.shape {
            FeatureShape::Attribute if def.id => self.set(feature, m.attribute_id, true)?,
            FeatureShape::Reference { containment: true } => {
                self.set(feature, m.reference_containment, true)?
            }
            _ => {}
        }
        if let Some(value) = def.default_value {
            self.set(feature, m.feature_default_value, value)?;
        }
        if let Some(literal) = def.default_literal {
            self.set(feature, m.feature_default_value_literal, literal)?;
        }

        let features = CollectionRef {
            owner: class,
            feature: m.class_structural_features,
        };
        self.add(features, feature)?;

        if let Some(opposite) = def.opposite {
            self.set(feature, m.reference_opposite, opposite)?;
        }
        Ok(feature)
    }

    /// Add an operation to a class
    pub fn define_operation(&mut self, class: ObjectId, def: OperationDefinition) -> MopResult<ObjectId> {
        let m = self.meta;
        let operation = self.instantiate(m.e_operation)?;
        self.set(operation, m.named_element_name, def.name.as_str())?;
        if let Some(ty) = def.returns {
            self.set(operation, m.typed_element_type, ty)?;
        }

        let params = CollectionRef {
            owner: operation,
            feature: m.operation_parameters,
        };
        for param in def.parameters {
            let parameter = self.instantiate(m.e_parameter)?;
            self.set(parameter, m.named_element_name, param.name.as_str())?;
            self.set(parameter, m.typed_element_type, param.ty)?;
            if param.required {
                self.set(parameter, m.typed_element_lower_bound, 1i64)?;
            }
            self.add(params, parameter)?;
        }
        let exceptions = CollectionRef {
            owner: operation,
            feature: m.operation_exceptions,
        };
        self.add_all(exceptions, def.exceptions)?;

        let operations = CollectionRef {
            owner: class,
            feature: m.class_operations,
        };
        self.add(operations, operation)?;
        Ok(operation)
    }

    /// Remove an operation from a class
    pub fn remove_operation(&mut self, class: ObjectId, operation: ObjectId) -> MopResult<bool> {
        let operations = CollectionRef {
            owner: class,
            feature: self.meta.class_operations,
        };
        self.remove(operations, &Value::Object(operation))
    }

    /// Create a package
    pub fn create_package(&mut self, name: &str, ns_uri: &str, ns_prefix: &str) -> MopResult<ObjectId> {
        let m = self.meta;
        let package = self.instantiate(m.e_package)?;
        self.set(package, m.named_element_name, name)?;
        self.set(package, m.package_ns_uri, ns_uri)?;
        self.set(package, m.package_ns_prefix, ns_prefix)?;
        Ok(package)
    }

    /// Place a classifier in a package
    pub fn add_classifier(&mut self, package: ObjectId, classifier: ObjectId) -> MopResult<bool> {
        let classifiers = CollectionRef {
            owner: package,
            feature: self.meta.package_classifiers,
        };
        self.add(classifiers, classifier)
    }

    /// Nest a package inside another
    pub fn add_subpackage(&mut self, package: ObjectId, subpackage: ObjectId) -> MopResult<bool> {
        let subpackages = CollectionRef {
            owner: package,
            feature: self.meta.package_subpackages,
        };
        self.add(subpackages, subpackage)
    }

    /// Create a data type wrapping a primitive kind
    pub fn create_data_type(&mut self, name: &str, binding: DataTypeBinding) -> MopResult<ObjectId> {
        let data_type = self.instantiate(self.meta.e_data_type)?;
        self.set(data_type, self.meta.named_element_name, name)?;
        self.bind_data_type(data_type, binding);
        Ok(data_type)
    }

    /// Create a data type from a host type name such as `java.lang.Integer`
    pub fn create_data_type_for(&mut self, name: &str, instance_class_name: &str) -> MopResult<ObjectId> {
        let data_type = self.instantiate(self.meta.e_data_type)?;
        self.set(data_type, self.meta.named_element_name, name)?;
        self.set(
            data_type,
            self.meta.classifier_instance_class_name,
            instance_class_name,
        )?;
        if let Some(kind) = PrimitiveKind::from_instance_class_name(instance_class_name) {
            self.bind_data_type(data_type, DataTypeBinding::of_kind(kind));
        }
        Ok(data_type)
    }

    /// Create an enum with literals valued 0, 1, 2... in order
    ///
    /// The default is the named literal, or the first literal when `None`.
    pub fn create_enum(
        &mut self,
        name: &str,
        literals: &[&str],
        default: Option<&str>,
    ) -> MopResult<ObjectId> {
        let enumeration = self.instantiate(self.meta.e_enum)?;
        self.set(enumeration, self.meta.named_element_name, name)?;
        for (value, literal) in literals.iter().enumerate() {
            self.add_enum_literal(enumeration, literal, value as i64)?;
        }
        if let Some(default) = default {
            let literal = self.from_string(enumeration, default)?;
            self.bind_data_type(enumeration, DataTypeBinding::new(PrimitiveKind::Any, literal));
        }
        Ok(enumeration)
    }

    /// Append a literal to an enum
    pub fn add_enum_literal(&mut self, enumeration: ObjectId, name: &str, value: i64) -> MopResult<ObjectId> {
        let m = self.meta;
        let literal = self.instantiate(m.e_enum_literal)?;
        self.set(literal, m.named_element_name, name)?;
        self.set(literal, m.enum_literal_value, value)?;
        self.set(literal, m.enum_literal_literal, name)?;
        let literals = CollectionRef {
            owner: enumeration,
            feature: m.enum_literals,
        };
        self.add(literals, literal)?;
        Ok(literal)
    }

    /// Attach an annotation to a model element
    pub fn annotate(
        &mut self,
        element: ObjectId,
        source: &str,
        details: BTreeMap<String, String>,
    ) -> MopResult<ObjectId> {
        let m = self.meta;
        let annotation = self.instantiate(m.e_annotation)?;
        self.set(annotation, m.annotation_source, source)?;
        self.set(annotation, m.annotation_details, details)?;
        let annotations = CollectionRef {
            owner: element,
            feature: m.model_element_annotations,
        };
        self.add(annotations, annotation)?;
        Ok(annotation)
    }

    /// Annotation of a model element by source
    pub fn annotation(&self, element: ObjectId, source: &str) -> Option<ObjectId> {
        self.raw_objects(element, self.meta.model_element_annotations)
            .into_iter()
            .find(|a| self.raw_str(*a, self.meta.annotation_source) == Some(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_feature_sets_containing_class() {
        let mut rt = Runtime::new();
        let class = rt.create_class("Node").unwrap();
        let string = rt.meta().e_string;
        let label = rt
            .define_feature(class, FeatureDefinition::attribute("label", string))
            .unwrap();
        assert_eq!(rt.containing_class(label), Some(class));
        assert_eq!(rt.container(label).unwrap(), Some(class));
        assert_eq!(rt.structural_features(class), vec![label]);
        assert_eq!(rt.feature_type(label), Some(string));
    }

    #[test]
    fn test_feature_flags_round_trip() {
        let mut rt = Runtime::new();
        let class = rt.create_class("Node").unwrap();
        let children = rt
            .define_feature(class, FeatureDefinition::containment("children", class).many())
            .unwrap();
        assert!(rt.is_many(children));
        assert!(rt.is_containment(children));
        assert!(rt.is_reference(children));
        assert_eq!(rt.upper_bound(children), UNBOUNDED);
    }

    #[test]
    fn test_opposite_pairing_is_symmetric() {
        let mut rt = Runtime::new();
        let class = rt.create_class("Node").unwrap();
        let children = rt
            .define_feature(class, FeatureDefinition::containment("children", class).many())
            .unwrap();
        let parent = rt
            .define_feature(
                class,
                FeatureDefinition::reference("parent", class).opposite(children),
            )
            .unwrap();
        assert_eq!(rt.opposite(parent), Some(children));
        assert_eq!(rt.opposite(children), Some(parent));
        assert!(rt.is_container(parent));
    }

    #[test]
    fn test_enum_literals() {
        let mut rt = Runtime::new();
        let color = rt.create_enum("Color", &["red", "green", "blue"], None).unwrap();
        let green = rt.enum_literal(color, "green").unwrap();
        assert_eq!(rt.literal_value(green), 1);
        assert_eq!(rt.enum_literal_by_value(color, 2), rt.enum_literal(color, "blue"));
        assert_eq!(rt.data_type_default(color), Value::Object(rt.literals(color)[0]));
        assert_eq!(rt.from_string(color, "green").unwrap(), Value::Object(green));
        assert_eq!(rt.to_string(color, &Value::Object(green)).unwrap(), "green");
        assert!(rt.from_string(color, "purple").is_err());
    }

    #[test]
    fn test_enum_explicit_default() {
        let mut rt = Runtime::new();
        let size = rt.create_enum("Size", &["small", "medium"], Some("medium")).unwrap();
        let medium = rt.enum_literal(size, "medium").unwrap();
        assert_eq!(rt.data_type_default(size), Value::Object(medium));
        assert!(rt.create_enum("Bad", &["a"], Some("z")).is_err());
    }

    #[test]
    fn test_custom_data_type() {
        let mut rt = Runtime::new();
        let big = rt.create_data_type_for("BigInt", "java.math.BigInteger").unwrap();
        assert_eq!(rt.data_type_kind(big), PrimitiveKind::Int);
        let url = rt
            .create_data_type("Url", DataTypeBinding::new(PrimitiveKind::String, Value::string("about:blank")))
            .unwrap();
        assert_eq!(rt.data_type_default(url), Value::string("about:blank"));
        assert!(rt.conforms(&Value::string("https://x"), url));
        assert!(!rt.conforms(&Value::Int(1), url));
    }

    #[test]
    fn test_package_membership() {
        let mut rt = Runtime::new();
        let pkg = rt.create_package("shop", "http://example.org/shop", "shop").unwrap();
        let item = rt.create_class("Item").unwrap();
        rt.add_classifier(pkg, item).unwrap();
        assert_eq!(rt.package_of(item), Some(pkg));
        assert_eq!(rt.container(item).unwrap(), Some(pkg));
        assert_eq!(rt.package_classifier(pkg, "Item"), Some(item));
    }

    #[test]
    fn test_annotations() {
        let mut rt = Runtime::new();
        let item = rt.create_class("Item").unwrap();
        let mut details = BTreeMap::new();
        details.insert("documentation".to_string(), "A sellable item".to_string());
        let note = rt.annotate(item, "http://example.org/doc", details).unwrap();
        assert_eq!(rt.annotation(item, "http://example.org/doc"), Some(note));
        let m = *rt.meta();
        assert_eq!(rt.get(note, m.annotation_model_element).unwrap(), Value::Object(item));
        assert_eq!(rt.container(note).unwrap(), Some(item));
    }
}
