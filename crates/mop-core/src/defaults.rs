//! Default constants for runtime configuration.

/// Default number of arena slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Name of the self-describing meta-metamodel package.
pub const ECORE_PACKAGE_NAME: &str = "ecore";

/// Namespace URI of the meta-metamodel package.
pub const ECORE_NS_URI: &str = "http://www.eclipse.org/emf/2002/Ecore";

/// Namespace prefix of the meta-metamodel package.
pub const ECORE_NS_PREFIX: &str = "ecore";

/// `upperBound` value meaning "unbounded".
pub const UNBOUNDED: i64 = -1;
