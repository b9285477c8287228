//! Mop Core Runtime
//!
//! This crate provides a self-describing meta-object protocol:
//! - Classifiers (classes, data types, enums) represented as ordinary objects
//! - Schema-driven instances with reflective `get`/`set`
//! - Containment and opposite-reference consistency on every mutation
//! - Relational collections backing multi-valued features
//! - Per-instance change notification
//! - A meta-metamodel that describes itself (`EClass` is an instance of `EClass`)
//!
//! # Example
//!
//! ```rust,ignore
//! use mop_core::{FeatureDefinition, Runtime, Value};
//!
//! let mut rt = Runtime::new();
//! let person = rt.create_class("Person")?;
//! let string = rt.meta().e_string;
//! rt.define_feature(person, FeatureDefinition::attribute("name", string))?;
//! let friends = rt.define_feature(person, FeatureDefinition::reference("friends", person).many())?;
//! rt.set(friends, "eOpposite", friends)?;
//!
//! let a = rt.instantiate(person)?;
//! let b = rt.instantiate(person)?;
//! rt.many(a, "friends")?.add(b)?;
//! assert!(rt.many(b, "friends")?.contains(&Value::Object(a)));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::new_without_default)]

pub mod builder;
pub mod collection;
pub mod conformance;
pub mod defaults;
pub mod descriptor;
pub mod gc;
pub mod heap;
pub mod many;
pub mod meta;
pub mod navigation;
pub mod notify;
pub mod object;
pub mod operations;
pub mod options;
pub mod propagate;
pub mod reflect;
pub mod registry;
pub mod runtime;
pub mod types;
pub mod value;

pub use builder::{FeatureDefinition, FeatureShape, OperationDefinition, ParameterDefinition};
pub use collection::{Collection, CollectionKind};
pub use gc::GcStats;
pub use heap::Heap;
pub use many::ManyMut;
pub use meta::{DataTypeBinding, MetaIds};
pub use notify::{Notification, NotificationKind, NotificationLog, Observer, ObserverId};
pub use object::ObjectData;
pub use operations::OperationHandler;
pub use options::{AdHocPolicy, BoundsPolicy, RuntimeOptions};
pub use reflect::FeatureRef;
pub use registry::ClassifierRegistry;
pub use runtime::Runtime;
pub use value::{CollectionRef, ObjectId, PrimitiveKind, ProxyRef, UnitHandle, Value};

/// Meta-object protocol errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MopError {
    /// Assigned value does not conform to the feature's declared classifier
    #[error("Expected a value of type {expected}, but got {found}")]
    TypeConformance {
        /// Name of the declared classifier
        expected: String,
        /// Description of the rejected value
        found: String,
    },

    /// Instantiation attempted on an abstract class
    #[error("Can't instantiate abstract class {class}")]
    AbstractType {
        /// Name of the abstract class
        class: String,
    },

    /// Feature not found on the type and no ad-hoc fallback applies
    #[error("Class {class} has no feature named {feature}")]
    UnknownFeature {
        /// Name of the instance's class
        class: String,
        /// Requested feature name or descriptor
        feature: String,
    },

    /// Supertype chain would include the class itself
    #[error("Adding supertype {supertype} to {class} would create an inheritance cycle")]
    CyclicSupertype {
        /// Class being mutated
        class: String,
        /// Rejected supertype
        supertype: String,
    },

    /// Handle refers to a reclaimed or never-allocated object
    #[error("Dangling object handle {0}")]
    DanglingObject(ObjectId),

    /// Operation name not found on the type
    #[error("Class {class} has no operation named {operation}")]
    UnknownOperation {
        /// Name of the receiver's class
        class: String,
        /// Requested operation name
        operation: String,
    },

    /// Operation exists but no implementation is installed
    #[error("Operation {class}.{operation} is not implemented")]
    OperationNotImplemented {
        /// Name of the class declaring the operation
        class: String,
        /// Operation name
        operation: String,
    },

    /// Invocation argument count outside the declared parameter bounds
    #[error("Operation {operation} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        /// Operation name
        operation: String,
        /// Accepted argument count, e.g. `2` or `1..=3`
        expected: String,
        /// Supplied argument count
        found: usize,
    },

    /// Collection operation not supported by the collection kind
    #[error("Operation {operation} is not supported on collection {feature}")]
    UnsupportedCollectionOperation {
        /// Feature backing the collection
        feature: String,
        /// Rejected operation
        operation: &'static str,
    },

    /// Positional collection access out of range
    #[error("Index {index} out of bounds (length: {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Collection length
        len: usize,
    },

    /// Data type string conversion failed
    #[error("Cannot convert {literal:?} to {datatype}")]
    Conversion {
        /// Data type name
        datatype: String,
        /// Rejected literal
        literal: String,
    },

    /// A different classifier is already registered under this name
    #[error("Classifier {0} is already registered")]
    DuplicateClassifier(String),

    /// A different package is already registered under this namespace URI
    #[error("Package {0} is already registered")]
    DuplicatePackage(String),

    /// Collection would grow past the feature's upper bound
    #[error("Feature {feature} accepts at most {upper} value(s)")]
    UpperBoundExceeded {
        /// Feature name
        feature: String,
        /// Declared upper bound
        upper: i64,
    },
}

/// Result alias used throughout the crate
pub type MopResult<T> = Result<T, MopError>;
