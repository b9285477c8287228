//! Typed reads of descriptor data
//!
//! Descriptors (classes, features, operations, literals) are ordinary
//! objects; these accessors read their slots by well-known feature id and
//! apply the meta-level defaults when a slot is absent. Because they bypass
//! name resolution they are safe to call while resolving names.

use crate::collection::CollectionKind;
use crate::value::{ObjectId, Value};
use crate::Runtime;

impl Runtime {
    // ===== Classification =====

    /// Whether `obj` is an instance of `meta_class` or one of its subclasses
    pub(crate) fn is_a(&self, obj: ObjectId, meta_class: ObjectId) -> bool {
        match self.heap.try_get(obj) {
            Some(data) => self.is_kind_of(data.class, meta_class),
            None => false,
        }
    }

    /// Whether `obj` is a class descriptor
    pub fn is_class(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_class)
    }

    /// Whether `obj` is a data type descriptor (enums included)
    pub fn is_data_type(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_data_type)
    }

    /// Whether `obj` is an enum descriptor
    pub fn is_enum(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_enum)
    }

    /// Whether `obj` is a structural feature descriptor
    pub fn is_feature(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_structural_feature)
    }

    /// Whether `obj` is a reference descriptor
    pub fn is_reference(&self, feature: ObjectId) -> bool {
        self.is_a(feature, self.meta.e_reference)
    }

    /// Whether `obj` is an attribute descriptor
    pub fn is_attribute(&self, feature: ObjectId) -> bool {
        self.is_a(feature, self.meta.e_attribute)
    }

    /// Whether `obj` is an operation descriptor
    pub fn is_operation(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_operation)
    }

    /// Whether `obj` is a package
    pub fn is_package(&self, obj: ObjectId) -> bool {
        self.is_a(obj, self.meta.e_package)
    }

    // ===== Named elements =====

    /// `name` of a named element
    pub fn name(&self, obj: ObjectId) -> Option<&str> {
        self.raw_str(obj, self.meta.named_element_name)
    }

    // ===== Typed elements =====

    /// Declared classifier of a feature, operation or parameter
    pub fn feature_type(&self, typed: ObjectId) -> Option<ObjectId> {
        self.raw_object(typed, self.meta.typed_element_type)
    }

    /// `lowerBound`, defaulting to 0
    pub fn lower_bound(&self, typed: ObjectId) -> i64 {
        self.raw_int(typed, self.meta.typed_element_lower_bound)
            .unwrap_or(0)
    }

    /// `upperBound`, defaulting to 1; negative means unbounded
    pub fn upper_bound(&self, typed: ObjectId) -> i64 {
        self.raw_int(typed, self.meta.typed_element_upper_bound)
            .unwrap_or(1)
    }

    /// Multi-valued iff the upper bound is unbounded or greater than 1
    pub fn is_many(&self, typed: ObjectId) -> bool {
        let upper = self.upper_bound(typed);
        upper < 0 || upper > 1
    }

    /// Lower bound of at least one
    pub fn is_required(&self, typed: ObjectId) -> bool {
        self.lower_bound(typed) >= 1
    }

    /// `ordered`, defaulting to true
    pub fn is_ordered(&self, typed: ObjectId) -> bool {
        self.raw_bool(typed, self.meta.typed_element_ordered)
            .unwrap_or(true)
    }

    /// `unique`, defaulting to true
    pub fn is_unique(&self, typed: ObjectId) -> bool {
        self.raw_bool(typed, self.meta.typed_element_unique)
            .unwrap_or(true)
    }

    /// Collection discipline for a multi-valued feature
    pub fn collection_kind(&self, feature: ObjectId) -> CollectionKind {
        CollectionKind::from_flags(self.is_ordered(feature), self.is_unique(feature))
    }

    // ===== Structural features =====

    /// `changeable`, defaulting to true
    pub fn is_changeable(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.feature_changeable)
            .unwrap_or(true)
    }

    /// `derived`
    pub fn is_derived(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.feature_derived)
            .unwrap_or(false)
    }

    /// `transient`
    pub fn is_transient(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.feature_transient)
            .unwrap_or(false)
    }

    /// `volatile`
    pub fn is_volatile(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.feature_volatile)
            .unwrap_or(false)
    }

    /// `unsettable`
    pub fn is_unsettable(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.feature_unsettable)
            .unwrap_or(false)
    }

    /// `iD` flag of an attribute
    pub fn is_id(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.attribute_id)
            .unwrap_or(false)
    }

    /// Class declaring a feature
    pub fn containing_class(&self, feature: ObjectId) -> Option<ObjectId> {
        self.raw_object(feature, self.meta.feature_containing_class)
    }

    /// `containment` flag of a reference
    pub fn is_containment(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.reference_containment)
            .unwrap_or(false)
    }

    /// Whether a reference is the container side of a containment pair
    pub fn is_container(&self, feature: ObjectId) -> bool {
        self.opposite(feature)
            .is_some_and(|opposite| self.is_containment(opposite))
    }

    /// `eOpposite` of a reference
    pub fn opposite(&self, feature: ObjectId) -> Option<ObjectId> {
        self.raw_object(feature, self.meta.reference_opposite)
    }

    /// `resolveProxies`, defaulting to true
    pub fn resolves_proxies(&self, feature: ObjectId) -> bool {
        self.raw_bool(feature, self.meta.reference_resolve_proxies)
            .unwrap_or(true)
    }

    /// Default value of a single-valued feature
    ///
    /// References default to null. Attributes use the explicit default, then
    /// the default literal converted through the type, then the type's
    /// default.
    pub fn default_value(&self, feature: ObjectId) -> Value {
        if self.is_reference(feature) {
            return Value::Null;
        }
        if let Some(value) = self
            .raw(feature, self.meta.feature_default_value)
            .filter(|v| !v.is_null())
        {
            return value.clone();
        }
        let ty = self.feature_type(feature);
        if let (Some(literal), Some(ty)) = (
            self.raw_str(feature, self.meta.feature_default_value_literal),
            ty,
        ) {
            if let Ok(value) = self.from_string(ty, literal) {
                return value;
            }
        }
        match ty {
            Some(ty) if self.is_data_type(ty) => self.data_type_default(ty),
            _ => Value::Null,
        }
    }

    // ===== Classes =====

    /// `abstract` flag of a class
    pub fn is_abstract(&self, class: ObjectId) -> bool {
        self.raw_bool(class, self.meta.class_abstract)
            .unwrap_or(false)
    }

    /// `interface` flag of a class
    pub fn is_interface(&self, class: ObjectId) -> bool {
        self.raw_bool(class, self.meta.class_interface)
            .unwrap_or(false)
    }

    /// Direct supertypes in declaration order
    pub fn super_types(&self, class: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(class, self.meta.class_super_types)
    }

    /// Features declared directly on a class
    pub fn structural_features(&self, class: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(class, self.meta.class_structural_features)
    }

    /// Operations declared directly on a class
    pub fn declared_operations(&self, class: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(class, self.meta.class_operations)
    }

    /// Attributes declared directly on a class
    pub fn attributes(&self, class: ObjectId) -> Vec<ObjectId> {
        self.structural_features(class)
            .into_iter()
            .filter(|f| self.is_attribute(*f))
            .collect()
    }

    /// References declared directly on a class
    pub fn references(&self, class: ObjectId) -> Vec<ObjectId> {
        self.structural_features(class)
            .into_iter()
            .filter(|f| self.is_reference(*f))
            .collect()
    }

    /// Attribute flagged `iD`, searching supertypes
    pub fn id_attribute(&self, class: ObjectId) -> Option<ObjectId> {
        self.all_features(class)
            .into_iter()
            .find(|f| self.is_attribute(*f) && self.is_id(*f))
    }

    // ===== Operations =====

    /// Parameters of an operation in declaration order
    pub fn parameters(&self, operation: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(operation, self.meta.operation_parameters)
    }

    /// Class declaring an operation
    pub fn operation_class(&self, operation: ObjectId) -> Option<ObjectId> {
        self.raw_object(operation, self.meta.operation_containing_class)
    }

    // ===== Enums =====

    /// Literals of an enum in declaration order
    pub fn literals(&self, enumeration: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(enumeration, self.meta.enum_literals)
    }

    /// Literal of an enum by name
    pub fn enum_literal(&self, enumeration: ObjectId, name: &str) -> Option<ObjectId> {
        self.literals(enumeration)
            .into_iter()
            .find(|lit| self.name(*lit) == Some(name))
    }

    /// Literal of an enum by integer value
    pub fn enum_literal_by_value(&self, enumeration: ObjectId, value: i64) -> Option<ObjectId> {
        self.literals(enumeration)
            .into_iter()
            .find(|lit| self.raw_int(*lit, self.meta.enum_literal_value) == Some(value))
    }

    /// Integer value of an enum literal
    pub fn literal_value(&self, literal: ObjectId) -> i64 {
        self.raw_int(literal, self.meta.enum_literal_value)
            .unwrap_or(0)
    }

    // ===== Packages =====

    /// Package owning a classifier
    pub fn package_of(&self, classifier: ObjectId) -> Option<ObjectId> {
        self.raw_object(classifier, self.meta.classifier_package)
    }

    /// `nsURI` of a package
    pub fn ns_uri(&self, package: ObjectId) -> Option<&str> {
        self.raw_str(package, self.meta.package_ns_uri)
    }

    /// `nsPrefix` of a package
    pub fn ns_prefix(&self, package: ObjectId) -> Option<&str> {
        self.raw_str(package, self.meta.package_ns_prefix)
    }

    /// Classifiers of a package
    pub fn classifiers(&self, package: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(package, self.meta.package_classifiers)
    }

    /// Direct subpackages of a package
    pub fn subpackages(&self, package: ObjectId) -> Vec<ObjectId> {
        self.raw_objects(package, self.meta.package_subpackages)
    }

    /// Classifier of a package by name
    pub fn package_classifier(&self, package: ObjectId, name: &str) -> Option<ObjectId> {
        self.classifiers(package)
            .into_iter()
            .find(|c| self.name(*c) == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_feature_flags() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert!(rt.is_many(m.class_structural_features));
        assert!(rt.is_containment(m.class_structural_features));
        assert!(!rt.is_many(m.named_element_name));
        assert!(rt.is_attribute(m.named_element_name));
        assert!(rt.is_reference(m.class_super_types));
        assert!(!rt.is_containment(m.class_super_types));
        assert_eq!(rt.opposite(m.reference_opposite), Some(m.reference_opposite));
        assert_eq!(
            rt.opposite(m.class_structural_features),
            Some(m.feature_containing_class)
        );
        assert!(rt.is_container(m.feature_containing_class));
    }

    #[test]
    fn test_meta_defaults() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.default_value(m.typed_element_upper_bound), Value::Int(1));
        assert_eq!(rt.default_value(m.typed_element_ordered), Value::Bool(true));
        assert_eq!(rt.default_value(m.class_abstract), Value::Bool(false));
        assert_eq!(rt.default_value(m.named_element_name), Value::Null);
        assert_eq!(rt.default_value(m.typed_element_type), Value::Null);
    }

    #[test]
    fn test_classification() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert!(rt.is_class(m.e_class));
        assert!(rt.is_class(m.e_object));
        assert!(rt.is_data_type(m.e_string));
        assert!(!rt.is_enum(m.e_string));
        assert!(rt.is_feature(m.class_abstract));
        assert!(rt.is_package(m.ecore_package));
        assert!(rt.is_abstract(m.e_classifier));
        assert!(!rt.is_abstract(m.e_class));
    }

    #[test]
    fn test_package_contents() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.ns_uri(m.ecore_package), Some(crate::defaults::ECORE_NS_URI));
        assert_eq!(rt.package_classifier(m.ecore_package, "EClass"), Some(m.e_class));
        assert_eq!(rt.package_of(m.e_int), Some(m.ecore_package));
        assert_eq!(rt.attributes(m.e_attribute), vec![m.attribute_id]);
    }
}
