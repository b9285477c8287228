//! Meta-metamodel
//!
//! The meta level is made of ordinary arena objects. [`MetaIds`] records the
//! handles of the well-known meta-classes, data types and meta-features so
//! that the runtime can read descriptor data directly by feature id, without
//! going through name resolution (which itself reads descriptors).

pub mod bootstrap;
pub mod datatype;

pub use datatype::DataTypeBinding;

use crate::value::{ObjectId, Value};
use crate::MopResult;

/// Handles of the bootstrapped meta-level objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetaIds {
    /// The `ecore` package
    pub ecore_package: ObjectId,

    // Meta-classes
    /// `EObject`, the implicit root of every class
    pub e_object: ObjectId,
    /// `EModelElement`
    pub e_model_element: ObjectId,
    /// `EAnnotation`
    pub e_annotation: ObjectId,
    /// `ENamedElement`
    pub e_named_element: ObjectId,
    /// `EPackage`
    pub e_package: ObjectId,
    /// `EClassifier`
    pub e_classifier: ObjectId,
    /// `EClass`
    pub e_class: ObjectId,
    /// `EDataType`
    pub e_data_type: ObjectId,
    /// `EEnum`
    pub e_enum: ObjectId,
    /// `EEnumLiteral`
    pub e_enum_literal: ObjectId,
    /// `ETypedElement`
    pub e_typed_element: ObjectId,
    /// `EStructuralFeature`
    pub e_structural_feature: ObjectId,
    /// `EAttribute`
    pub e_attribute: ObjectId,
    /// `EReference`
    pub e_reference: ObjectId,
    /// `EOperation`
    pub e_operation: ObjectId,
    /// `EParameter`
    pub e_parameter: ObjectId,

    // Data types
    /// `EString`
    pub e_string: ObjectId,
    /// `EBoolean`
    pub e_boolean: ObjectId,
    /// `EInt`
    pub e_int: ObjectId,
    /// `ELong`
    pub e_long: ObjectId,
    /// `EDouble`
    pub e_double: ObjectId,
    /// `EFloat`
    pub e_float: ObjectId,
    /// `EStringToStringMapEntry`
    pub e_string_to_string_map_entry: ObjectId,
    /// `EDiagnosticChain`
    pub e_diagnostic_chain: ObjectId,
    /// `ENativeType`
    pub e_native_type: ObjectId,
    /// `EJavaObject`
    pub e_java_object: ObjectId,
    /// `EJavaClass`
    pub e_java_class: ObjectId,

    // Meta-features
    /// `EModelElement.eAnnotations`
    pub model_element_annotations: ObjectId,
    /// `EAnnotation.source`
    pub annotation_source: ObjectId,
    /// `EAnnotation.details`
    pub annotation_details: ObjectId,
    /// `EAnnotation.eModelElement`
    pub annotation_model_element: ObjectId,
    /// `EAnnotation.references`
    pub annotation_references: ObjectId,
    /// `EAnnotation.contents`
    pub annotation_contents: ObjectId,
    /// `ENamedElement.name`
    pub named_element_name: ObjectId,
    /// `EPackage.nsURI`
    pub package_ns_uri: ObjectId,
    /// `EPackage.nsPrefix`
    pub package_ns_prefix: ObjectId,
    /// `EPackage.eClassifiers`
    pub package_classifiers: ObjectId,
    /// `EPackage.eSubpackages`
    pub package_subpackages: ObjectId,
    /// `EPackage.eSuperPackage`
    pub package_super_package: ObjectId,
    /// `EClassifier.ePackage`
    pub classifier_package: ObjectId,
    /// `EClassifier.instanceClassName`
    pub classifier_instance_class_name: ObjectId,
    /// `EClass.abstract`
    pub class_abstract: ObjectId,
    /// `EClass.interface`
    pub class_interface: ObjectId,
    /// `EClass.eStructuralFeatures`
    pub class_structural_features: ObjectId,
    /// `EClass.eSuperTypes`
    pub class_super_types: ObjectId,
    /// `EClass.eOperations`
    pub class_operations: ObjectId,
    /// `EDataType.serializable`
    pub data_type_serializable: ObjectId,
    /// `EEnum.eLiterals`
    pub enum_literals: ObjectId,
    /// `EEnumLiteral.value`
    pub enum_literal_value: ObjectId,
    /// `EEnumLiteral.literal`
    pub enum_literal_literal: ObjectId,
    /// `EEnumLiteral.eEnum`
    pub enum_literal_enum: ObjectId,
    /// `ETypedElement.ordered`
    pub typed_element_ordered: ObjectId,
    /// `ETypedElement.unique`
    pub typed_element_unique: ObjectId,
    /// `ETypedElement.lowerBound`
    pub typed_element_lower_bound: ObjectId,
    /// `ETypedElement.upperBound`
    pub typed_element_upper_bound: ObjectId,
    /// `ETypedElement.eType`
    pub typed_element_type: ObjectId,
    /// `EStructuralFeature.changeable`
    pub feature_changeable: ObjectId,
    /// `EStructuralFeature.volatile`
    pub feature_volatile: ObjectId,
    /// `EStructuralFeature.transient`
    pub feature_transient: ObjectId,
    /// `EStructuralFeature.unsettable`
    pub feature_unsettable: ObjectId,
    /// `EStructuralFeature.derived`
    pub feature_derived: ObjectId,
    /// `EStructuralFeature.defaultValueLiteral`
    pub feature_default_value_literal: ObjectId,
    /// `EStructuralFeature.defaultValue`
    pub feature_default_value: ObjectId,
    /// `EStructuralFeature.eContainingClass`
    pub feature_containing_class: ObjectId,
    /// `EAttribute.iD`
    pub attribute_id: ObjectId,
    /// `EReference.containment`
    pub reference_containment: ObjectId,
    /// `EReference.eOpposite`
    pub reference_opposite: ObjectId,
    /// `EReference.resolveProxies`
    pub reference_resolve_proxies: ObjectId,
    /// `EOperation.eContainingClass`
    pub operation_containing_class: ObjectId,
    /// `EOperation.eParameters`
    pub operation_parameters: ObjectId,
    /// `EOperation.eExceptions`
    pub operation_exceptions: ObjectId,
    /// `EParameter.eOperation`
    pub parameter_operation: ObjectId,
}

/// Pre-assignment check run on values added to a feature
pub type ValueCheck = fn(&crate::Runtime, ObjectId, &Value) -> MopResult<()>;

/// Per-feature behaviour attached to specific meta-features
///
/// Keeps special rules (supertype acyclicity, hierarchy cache invalidation)
/// out of the generic assignment path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureHook {
    /// Run before a value is stored or added; may reject it
    pub validate: Option<ValueCheck>,
    /// Mutating this feature changes supertype closures
    pub invalidates_hierarchy: bool,
}
