//! Meta-metamodel bootstrap
//!
//! The meta level describes itself, so it cannot be built through the public
//! assignment path: `EClass` must exist before anything can be an instance of
//! it. Bootstrap therefore runs in two phases over static tables:
//!
//! 1. **Allocate**: one arena object per package, classifier and feature,
//!    with a placeholder class.
//! 2. **Link**: bind classes, write descriptor slots directly, then
//!    default-fill every remaining slot and mark everything ready.
//!
//! Only after phase 2 is the runtime open to reflective use.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{DataTypeBinding, FeatureHook, MetaIds};
use crate::collection::{Collection, CollectionKind};
use crate::defaults::{ECORE_NS_PREFIX, ECORE_NS_URI, ECORE_PACKAGE_NAME, UNBOUNDED};
use crate::object::{ObjectData, Slot};
use crate::value::{ObjectId, PrimitiveKind, Value};
use crate::Runtime;

/// Default value usable in a const table
#[derive(Debug, Clone, Copy)]
enum DefaultDecl {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    EmptyMap,
}

impl DefaultDecl {
    fn to_value(self) -> Value {
        match self {
            DefaultDecl::Null => Value::Null,
            DefaultDecl::Bool(b) => Value::Bool(b),
            DefaultDecl::Int(i) => Value::Int(i),
            DefaultDecl::Double(d) => Value::Double(d),
            DefaultDecl::EmptyMap => Value::Map(BTreeMap::new()),
        }
    }
}

struct ClassDecl {
    name: &'static str,
    is_abstract: bool,
    supers: &'static [&'static str],
}

struct DataTypeDecl {
    name: &'static str,
    instance_class: Option<&'static str>,
    kind: PrimitiveKind,
    default: DefaultDecl,
}

#[derive(Clone, Copy)]
enum Shape {
    Attribute,
    Reference {
        containment: bool,
        opposite: Option<(&'static str, &'static str)>,
    },
}

#[derive(Clone, Copy)]
struct FeatureDecl {
    owner: &'static str,
    name: &'static str,
    ty: &'static str,
    many: bool,
    shape: Shape,
    default: Option<DefaultDecl>,
    transient: bool,
}

impl FeatureDecl {
    const fn attr(owner: &'static str, name: &'static str, ty: &'static str) -> Self {
        Self {
            owner,
            name,
            ty,
            many: false,
            shape: Shape::Attribute,
            default: None,
            transient: false,
        }
    }

    const fn reference(owner: &'static str, name: &'static str, ty: &'static str) -> Self {
        Self {
            owner,
            name,
            ty,
            many: false,
            shape: Shape::Reference {
                containment: false,
                opposite: None,
            },
            default: None,
            transient: false,
        }
    }

    const fn many(self) -> Self {
        Self { many: true, ..self }
    }

    const fn containment(self) -> Self {
        let opposite = match self.shape {
            Shape::Reference { opposite, .. } => opposite,
            Shape::Attribute => None,
        };
        Self {
            shape: Shape::Reference {
                containment: true,
                opposite,
            },
            ..self
        }
    }

    const fn opposite(self, owner: &'static str, name: &'static str) -> Self {
        let containment = match self.shape {
            Shape::Reference { containment, .. } => containment,
            Shape::Attribute => false,
        };
        Self {
            shape: Shape::Reference {
                containment,
                opposite: Some((owner, name)),
            },
            ..self
        }
    }

    const fn default(self, value: DefaultDecl) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    const fn transient(self) -> Self {
        Self {
            transient: true,
            ..self
        }
    }
}

const CLASSES: &[ClassDecl] = &[
    ClassDecl { name: "EObject", is_abstract: false, supers: &[] },
    ClassDecl { name: "EModelElement", is_abstract: true, supers: &[] },
    ClassDecl { name: "EAnnotation", is_abstract: false, supers: &["EModelElement"] },
    ClassDecl { name: "ENamedElement", is_abstract: true, supers: &["EModelElement"] },
    ClassDecl { name: "EPackage", is_abstract: false, supers: &["ENamedElement"] },
    ClassDecl { name: "EClassifier", is_abstract: true, supers: &["ENamedElement"] },
    ClassDecl { name: "EClass", is_abstract: false, supers: &["EClassifier"] },
    ClassDecl { name: "EDataType", is_abstract: false, supers: &["EClassifier"] },
    ClassDecl { name: "EEnum", is_abstract: false, supers: &["EDataType"] },
    ClassDecl { name: "EEnumLiteral", is_abstract: false, supers: &["ENamedElement"] },
    ClassDecl { name: "ETypedElement", is_abstract: true, supers: &["ENamedElement"] },
    ClassDecl { name: "EStructuralFeature", is_abstract: true, supers: &["ETypedElement"] },
    ClassDecl { name: "EAttribute", is_abstract: false, supers: &["EStructuralFeature"] },
    ClassDecl { name: "EReference", is_abstract: false, supers: &["EStructuralFeature"] },
    ClassDecl { name: "EOperation", is_abstract: false, supers: &["ETypedElement"] },
    ClassDecl { name: "EParameter", is_abstract: false, supers: &["ETypedElement"] },
];

const DATA_TYPES: &[DataTypeDecl] = &[
    DataTypeDecl {
        name: "EString",
        instance_class: Some("java.lang.String"),
        kind: PrimitiveKind::String,
        default: DefaultDecl::Null,
    },
    DataTypeDecl {
        name: "EBoolean",
        instance_class: Some("boolean"),
        kind: PrimitiveKind::Bool,
        default: DefaultDecl::Bool(false),
    },
    DataTypeDecl {
        name: "EInt",
        instance_class: Some("int"),
        kind: PrimitiveKind::Int,
        default: DefaultDecl::Int(0),
    },
    DataTypeDecl {
        name: "ELong",
        instance_class: Some("long"),
        kind: PrimitiveKind::Int,
        default: DefaultDecl::Int(0),
    },
    DataTypeDecl {
        name: "EDouble",
        instance_class: Some("double"),
        kind: PrimitiveKind::Double,
        default: DefaultDecl::Double(0.0),
    },
    DataTypeDecl {
        name: "EFloat",
        instance_class: Some("float"),
        kind: PrimitiveKind::Double,
        default: DefaultDecl::Double(0.0),
    },
    DataTypeDecl {
        name: "EStringToStringMapEntry",
        instance_class: Some("java.util.Map$Entry"),
        kind: PrimitiveKind::Map,
        default: DefaultDecl::EmptyMap,
    },
    DataTypeDecl {
        name: "EDiagnosticChain",
        instance_class: Some("org.eclipse.emf.common.util.DiagnosticChain"),
        kind: PrimitiveKind::Any,
        default: DefaultDecl::Null,
    },
    DataTypeDecl {
        name: "ENativeType",
        instance_class: None,
        kind: PrimitiveKind::Any,
        default: DefaultDecl::Null,
    },
    DataTypeDecl {
        name: "EJavaObject",
        instance_class: Some("java.lang.Object"),
        kind: PrimitiveKind::Any,
        default: DefaultDecl::Null,
    },
    DataTypeDecl {
        name: "EJavaClass",
        instance_class: Some("java.lang.Class"),
        kind: PrimitiveKind::Any,
        default: DefaultDecl::Null,
    },
];

const FEATURES: &[FeatureDecl] = &[
    // EModelElement
    FeatureDecl::reference("EModelElement", "eAnnotations", "EAnnotation")
        .many()
        .containment()
        .opposite("EAnnotation", "eModelElement"),
    // EAnnotation
    FeatureDecl::attr("EAnnotation", "source", "EString"),
    FeatureDecl::attr("EAnnotation", "details", "EStringToStringMapEntry"),
    FeatureDecl::reference("EAnnotation", "eModelElement", "EModelElement")
        .opposite("EModelElement", "eAnnotations"),
    FeatureDecl::reference("EAnnotation", "references", "EObject").many(),
    FeatureDecl::reference("EAnnotation", "contents", "EObject")
        .many()
        .containment(),
    // ENamedElement
    FeatureDecl::attr("ENamedElement", "name", "EString"),
    // EPackage
    FeatureDecl::attr("EPackage", "nsURI", "EString"),
    FeatureDecl::attr("EPackage", "nsPrefix", "EString"),
    FeatureDecl::reference("EPackage", "eClassifiers", "EClassifier")
        .many()
        .containment()
        .opposite("EClassifier", "ePackage"),
    FeatureDecl::reference("EPackage", "eSubpackages", "EPackage")
        .many()
        .containment()
        .opposite("EPackage", "eSuperPackage"),
    FeatureDecl::reference("EPackage", "eSuperPackage", "EPackage")
        .opposite("EPackage", "eSubpackages"),
    // EClassifier
    FeatureDecl::reference("EClassifier", "ePackage", "EPackage")
        .opposite("EPackage", "eClassifiers"),
    FeatureDecl::attr("EClassifier", "instanceClassName", "EString"),
    // EClass
    FeatureDecl::attr("EClass", "abstract", "EBoolean"),
    FeatureDecl::attr("EClass", "interface", "EBoolean"),
    FeatureDecl::reference("EClass", "eStructuralFeatures", "EStructuralFeature")
        .many()
        .containment()
        .opposite("EStructuralFeature", "eContainingClass"),
    FeatureDecl::reference("EClass", "eSuperTypes", "EClass").many(),
    FeatureDecl::reference("EClass", "eOperations", "EOperation")
        .many()
        .containment()
        .opposite("EOperation", "eContainingClass"),
    // EDataType
    FeatureDecl::attr("EDataType", "serializable", "EBoolean").default(DefaultDecl::Bool(true)),
    // EEnum
    FeatureDecl::reference("EEnum", "eLiterals", "EEnumLiteral")
        .many()
        .containment()
        .opposite("EEnumLiteral", "eEnum"),
    // EEnumLiteral
    FeatureDecl::attr("EEnumLiteral", "value", "EInt"),
    FeatureDecl::attr("EEnumLiteral", "literal", "EString"),
    FeatureDecl::reference("EEnumLiteral", "eEnum", "EEnum").opposite("EEnum", "eLiterals"),
    // ETypedElement
    FeatureDecl::attr("ETypedElement", "ordered", "EBoolean").default(DefaultDecl::Bool(true)),
    FeatureDecl::attr("ETypedElement", "unique", "EBoolean").default(DefaultDecl::Bool(true)),
    FeatureDecl::attr("ETypedElement", "lowerBound", "EInt"),
    FeatureDecl::attr("ETypedElement", "upperBound", "EInt").default(DefaultDecl::Int(1)),
    FeatureDecl::reference("ETypedElement", "eType", "EClassifier"),
    // EStructuralFeature
    FeatureDecl::attr("EStructuralFeature", "changeable", "EBoolean")
        .default(DefaultDecl::Bool(true)),
    FeatureDecl::attr("EStructuralFeature", "volatile", "EBoolean"),
    FeatureDecl::attr("EStructuralFeature", "transient", "EBoolean"),
    FeatureDecl::attr("EStructuralFeature", "unsettable", "EBoolean"),
    FeatureDecl::attr("EStructuralFeature", "derived", "EBoolean"),
    FeatureDecl::attr("EStructuralFeature", "defaultValueLiteral", "EString"),
    FeatureDecl::attr("EStructuralFeature", "defaultValue", "EJavaObject").transient(),
    FeatureDecl::reference("EStructuralFeature", "eContainingClass", "EClass")
        .opposite("EClass", "eStructuralFeatures"),
    // EAttribute
    FeatureDecl::attr("EAttribute", "iD", "EBoolean"),
    // EReference
    FeatureDecl::attr("EReference", "containment", "EBoolean"),
    FeatureDecl::reference("EReference", "eOpposite", "EReference")
        .opposite("EReference", "eOpposite"),
    FeatureDecl::attr("EReference", "resolveProxies", "EBoolean")
        .default(DefaultDecl::Bool(true)),
    // EOperation
    FeatureDecl::reference("EOperation", "eContainingClass", "EClass")
        .opposite("EClass", "eOperations"),
    FeatureDecl::reference("EOperation", "eParameters", "EParameter")
        .many()
        .containment()
        .opposite("EParameter", "eOperation"),
    FeatureDecl::reference("EOperation", "eExceptions", "EClassifier").many(),
    // EParameter
    FeatureDecl::reference("EParameter", "eOperation", "EOperation")
        .opposite("EOperation", "eParameters"),
];

/// Handles allocated in phase 1, keyed by table name
struct Table {
    classifiers: FxHashMap<&'static str, ObjectId>,
    features: FxHashMap<(&'static str, &'static str), ObjectId>,
}

impl Table {
    fn classifier(&self, name: &str) -> ObjectId {
        match self.classifiers.get(name) {
            Some(id) => *id,
            None => panic!("meta table references undeclared classifier {name}"),
        }
    }

    fn feature(&self, owner: &str, name: &str) -> ObjectId {
        match self.features.get(&(owner, name)) {
            Some(id) => *id,
            None => panic!("meta table references undeclared feature {owner}.{name}"),
        }
    }

    fn meta_ids(&self, ecore_package: ObjectId) -> MetaIds {
        let c = |name| self.classifier(name);
        let f = |owner, name| self.feature(owner, name);
        MetaIds {
            ecore_package,
            e_object: c("EObject"),
            e_model_element: c("EModelElement"),
            e_annotation: c("EAnnotation"),
            e_named_element: c("ENamedElement"),
            e_package: c("EPackage"),
            e_classifier: c("EClassifier"),
            e_class: c("EClass"),
            e_data_type: c("EDataType"),
            e_enum: c("EEnum"),
            e_enum_literal: c("EEnumLiteral"),
            e_typed_element: c("ETypedElement"),
            e_structural_feature: c("EStructuralFeature"),
            e_attribute: c("EAttribute"),
            e_reference: c("EReference"),
            e_operation: c("EOperation"),
            e_parameter: c("EParameter"),
            e_string: c("EString"),
            e_boolean: c("EBoolean"),
            e_int: c("EInt"),
            e_long: c("ELong"),
            e_double: c("EDouble"),
            e_float: c("EFloat"),
            e_string_to_string_map_entry: c("EStringToStringMapEntry"),
            e_diagnostic_chain: c("EDiagnosticChain"),
            e_native_type: c("ENativeType"),
            e_java_object: c("EJavaObject"),
            e_java_class: c("EJavaClass"),
            model_element_annotations: f("EModelElement", "eAnnotations"),
            annotation_source: f("EAnnotation", "source"),
            annotation_details: f("EAnnotation", "details"),
            annotation_model_element: f("EAnnotation", "eModelElement"),
            annotation_references: f("EAnnotation", "references"),
            annotation_contents: f("EAnnotation", "contents"),
            named_element_name: f("ENamedElement", "name"),
            package_ns_uri: f("EPackage", "nsURI"),
            package_ns_prefix: f("EPackage", "nsPrefix"),
            package_classifiers: f("EPackage", "eClassifiers"),
            package_subpackages: f("EPackage", "eSubpackages"),
            package_super_package: f("EPackage", "eSuperPackage"),
            classifier_package: f("EClassifier", "ePackage"),
            classifier_instance_class_name: f("EClassifier", "instanceClassName"),
            class_abstract: f("EClass", "abstract"),
            class_interface: f("EClass", "interface"),
            class_structural_features: f("EClass", "eStructuralFeatures"),
            class_super_types: f("EClass", "eSuperTypes"),
            class_operations: f("EClass", "eOperations"),
            data_type_serializable: f("EDataType", "serializable"),
            enum_literals: f("EEnum", "eLiterals"),
            enum_literal_value: f("EEnumLiteral", "value"),
            enum_literal_literal: f("EEnumLiteral", "literal"),
            enum_literal_enum: f("EEnumLiteral", "eEnum"),
            typed_element_ordered: f("ETypedElement", "ordered"),
            typed_element_unique: f("ETypedElement", "unique"),
            typed_element_lower_bound: f("ETypedElement", "lowerBound"),
            typed_element_upper_bound: f("ETypedElement", "upperBound"),
            typed_element_type: f("ETypedElement", "eType"),
            feature_changeable: f("EStructuralFeature", "changeable"),
            feature_volatile: f("EStructuralFeature", "volatile"),
            feature_transient: f("EStructuralFeature", "transient"),
            feature_unsettable: f("EStructuralFeature", "unsettable"),
            feature_derived: f("EStructuralFeature", "derived"),
            feature_default_value_literal: f("EStructuralFeature", "defaultValueLiteral"),
            feature_default_value: f("EStructuralFeature", "defaultValue"),
            feature_containing_class: f("EStructuralFeature", "eContainingClass"),
            attribute_id: f("EAttribute", "iD"),
            reference_containment: f("EReference", "containment"),
            reference_opposite: f("EReference", "eOpposite"),
            reference_resolve_proxies: f("EReference", "resolveProxies"),
            operation_containing_class: f("EOperation", "eContainingClass"),
            operation_parameters: f("EOperation", "eParameters"),
            operation_exceptions: f("EOperation", "eExceptions"),
            parameter_operation: f("EParameter", "eOperation"),
        }
    }
}

/// Build the meta-metamodel inside a fresh runtime
pub(crate) fn install(rt: &mut Runtime) {
    // Phase 1: allocate
    let mut allocated = Vec::with_capacity(1 + CLASSES.len() + DATA_TYPES.len() + FEATURES.len());
    let mut alloc = |rt: &mut Runtime| {
        let id = rt.heap.allocate(ObjectData::new(ObjectId::PLACEHOLDER));
        allocated.push(id);
        id
    };

    let package = alloc(rt);
    let mut table = Table {
        classifiers: FxHashMap::default(),
        features: FxHashMap::default(),
    };
    for decl in CLASSES {
        let id = alloc(rt);
        table.classifiers.insert(decl.name, id);
    }
    for decl in DATA_TYPES {
        let id = alloc(rt);
        table.classifiers.insert(decl.name, id);
    }
    for decl in FEATURES {
        let id = alloc(rt);
        table.features.insert((decl.owner, decl.name), id);
    }

    rt.meta = table.meta_ids(package);
    let m = rt.meta;

    // Phase 2: link
    let classifiers: Vec<ObjectId> = CLASSES
        .iter()
        .map(|d| d.name)
        .chain(DATA_TYPES.iter().map(|d| d.name))
        .map(|name| table.classifier(name))
        .collect();

    bind_class(rt, package, m.e_package);
    put(rt, package, m.named_element_name, Value::string(ECORE_PACKAGE_NAME));
    put(rt, package, m.package_ns_uri, Value::string(ECORE_NS_URI));
    put(rt, package, m.package_ns_prefix, Value::string(ECORE_NS_PREFIX));
    put_many(rt, package, m.package_classifiers, &classifiers);

    for decl in CLASSES {
        let class = table.classifier(decl.name);
        let supers: Vec<ObjectId> = decl.supers.iter().map(|s| table.classifier(s)).collect();
        let features: Vec<ObjectId> = FEATURES
            .iter()
            .filter(|f| f.owner == decl.name)
            .map(|f| table.feature(f.owner, f.name))
            .collect();

        bind_class(rt, class, m.e_class);
        put(rt, class, m.named_element_name, Value::string(decl.name));
        put(rt, class, m.class_abstract, Value::Bool(decl.is_abstract));
        put_many(rt, class, m.class_super_types, &supers);
        put_many(rt, class, m.class_structural_features, &features);
        put(rt, class, m.classifier_package, Value::Object(package));
        contain(rt, class, package, m.package_classifiers);
    }

    for decl in DATA_TYPES {
        let data_type = table.classifier(decl.name);
        bind_class(rt, data_type, m.e_data_type);
        put(rt, data_type, m.named_element_name, Value::string(decl.name));
        if let Some(instance_class) = decl.instance_class {
            put(rt, data_type, m.classifier_instance_class_name, Value::string(instance_class));
        }
        put(rt, data_type, m.classifier_package, Value::Object(package));
        contain(rt, data_type, package, m.package_classifiers);
        rt.bindings.insert(
            data_type,
            DataTypeBinding::new(decl.kind, decl.default.to_value()),
        );
    }

    for decl in FEATURES {
        let feature = table.feature(decl.owner, decl.name);
        let owner = table.classifier(decl.owner);
        let meta_class = match decl.shape {
            Shape::Attribute => m.e_attribute,
            Shape::Reference { .. } => m.e_reference,
        };

        bind_class(rt, feature, meta_class);
        put(rt, feature, m.named_element_name, Value::string(decl.name));
        put(rt, feature, m.typed_element_type, Value::Object(table.classifier(decl.ty)));
        if decl.many {
            put(rt, feature, m.typed_element_upper_bound, Value::Int(UNBOUNDED));
        }
        if let Shape::Reference { containment, opposite } = decl.shape {
            put(rt, feature, m.reference_containment, Value::Bool(containment));
            if let Some((opp_owner, opp_name)) = opposite {
                put(rt, feature, m.reference_opposite, Value::Object(table.feature(opp_owner, opp_name)));
            }
        }
        if let Some(default) = decl.default {
            put(rt, feature, m.feature_default_value, default.to_value());
        }
        if decl.transient {
            put(rt, feature, m.feature_transient, Value::Bool(true));
        }
        put(rt, feature, m.feature_containing_class, Value::Object(owner));
        contain(rt, feature, owner, m.class_structural_features);
    }

    rt.hooks.insert(
        m.class_super_types,
        FeatureHook {
            validate: Some(crate::types::check_super_type),
            invalidates_hierarchy: true,
        },
    );
    rt.invalidate_hierarchy();

    for &id in &allocated {
        rt.materialize_defaults(id);
    }
    for &id in &allocated {
        if let Some(data) = rt.heap.try_get_mut(id) {
            data.ready = true;
        }
    }

    if let Err(err) = rt.register_package(package) {
        warn!(%err, "failed to register meta-metamodel package");
    }

    debug!(
        classes = CLASSES.len(),
        data_types = DATA_TYPES.len(),
        features = FEATURES.len(),
        "Bootstrapped meta-metamodel"
    );
}

fn bind_class(rt: &mut Runtime, obj: ObjectId, class: ObjectId) {
    if let Some(data) = rt.heap.try_get_mut(obj) {
        data.class = class;
    }
}

fn put(rt: &mut Runtime, obj: ObjectId, feature: ObjectId, value: Value) {
    if let Some(data) = rt.heap.try_get_mut(obj) {
        data.store(feature, value);
    }
}

fn put_many(rt: &mut Runtime, obj: ObjectId, feature: ObjectId, items: &[ObjectId]) {
    if let Some(data) = rt.heap.try_get_mut(obj) {
        let collection = Collection::from_items(
            CollectionKind::OrderedUnique,
            items.iter().copied().map(Value::Object),
        );
        data.slots.insert(feature, Slot::Many(collection));
    }
}

fn contain(rt: &mut Runtime, child: ObjectId, parent: ObjectId, feature: ObjectId) {
    if let Some(data) = rt.heap.try_get_mut(child) {
        data.container = Some(parent);
        data.containment_feature = Some(feature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_consistent() {
        let names: Vec<&str> = CLASSES
            .iter()
            .map(|c| c.name)
            .chain(DATA_TYPES.iter().map(|d| d.name))
            .collect();
        for class in CLASSES {
            for s in class.supers {
                assert!(names.contains(s), "unknown supertype {s}");
            }
        }
        for f in FEATURES {
            assert!(names.contains(&f.owner), "unknown owner {}", f.owner);
            assert!(names.contains(&f.ty), "unknown type {}", f.ty);
            if let Shape::Reference { opposite: Some((o, n)), .. } = f.shape {
                assert!(
                    FEATURES.iter().any(|g| g.owner == o && g.name == n),
                    "unknown opposite {o}.{n}"
                );
            }
        }
    }

    #[test]
    fn test_opposites_are_symmetric() {
        for f in FEATURES {
            if let Shape::Reference { opposite: Some((o, n)), .. } = f.shape {
                let Some(g) = FEATURES.iter().find(|g| g.owner == o && g.name == n) else {
                    panic!("missing {o}.{n}");
                };
                match g.shape {
                    Shape::Reference { opposite: Some(back), .. } => {
                        assert_eq!(back, (f.owner, f.name))
                    }
                    _ => panic!("{o}.{n} does not point back to {}.{}", f.owner, f.name),
                }
            }
        }
    }

    #[test]
    fn test_every_object_is_ready_and_classified() {
        let rt = Runtime::new();
        for (id, data) in rt.heap().iter() {
            assert!(data.is_ready(), "{id:?} not ready");
            assert!(!data.class().is_placeholder(), "{id:?} has no class");
        }
    }

    #[test]
    fn test_default_fill() {
        let rt = Runtime::new();
        let m = *rt.meta();
        let data = rt.heap().get(m.e_class).unwrap();
        assert_eq!(data.single(m.class_interface), Some(&Value::Bool(false)));
        assert!(data.collection(m.class_operations).is_some());
        assert!(data.collection(m.model_element_annotations).is_some());
    }
}
