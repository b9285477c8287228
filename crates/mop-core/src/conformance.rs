//! Value conformance
//!
//! Decides whether a value may be stored in a slot typed by a classifier.
//! Null and unresolved proxies conform to every classifier.

use crate::value::{ObjectId, Value};
use crate::{MopError, MopResult, Runtime};

impl Runtime {
    /// Whether `value` conforms to `classifier`
    pub fn conforms(&self, value: &Value, classifier: ObjectId) -> bool {
        if matches!(value, Value::Null | Value::Proxy(_)) {
            return true;
        }
        if self.is_enum(classifier) {
            return value
                .as_object()
                .is_some_and(|lit| self.literals(classifier).contains(&lit));
        }
        if self.is_data_type(classifier) {
            return self.data_type_kind(classifier).accepts(value);
        }
        if self.is_class(classifier) {
            return value
                .as_object()
                .and_then(|obj| self.heap.try_get(obj))
                .is_some_and(|data| self.is_kind_of(data.class, classifier));
        }
        false
    }

    /// Alias of [`Runtime::conforms`] phrased from the classifier's side
    pub fn is_instance(&self, classifier: ObjectId, value: &Value) -> bool {
        self.conforms(value, classifier)
    }

    /// Check a value against a feature's type and validation hook
    pub(crate) fn check_value(&self, owner: ObjectId, feature: ObjectId, value: &Value) -> MopResult<()> {
        if let Some(ty) = self.feature_type(feature) {
            if !self.conforms(value, ty) {
                return Err(MopError::TypeConformance {
                    expected: self.display_name(ty),
                    found: self.describe(value),
                });
            }
        }
        self.run_hook(owner, feature, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ProxyRef;

    #[test]
    fn test_primitive_conformance() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert!(rt.conforms(&Value::string("x"), m.e_string));
        assert!(!rt.conforms(&Value::Int(1), m.e_string));
        assert!(rt.conforms(&Value::Int(1), m.e_long));
        assert!(rt.conforms(&Value::Bool(true), m.e_java_object));
    }

    #[test]
    fn test_null_and_proxy_conform() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert!(rt.conforms(&Value::Null, m.e_int));
        assert!(rt.conforms(&Value::Proxy(ProxyRef::new("other#//X")), m.e_class));
    }

    #[test]
    fn test_class_conformance_follows_hierarchy() {
        let rt = Runtime::new();
        let m = *rt.meta();
        let enum_class = Value::Object(m.e_enum);
        assert!(rt.conforms(&enum_class, m.e_class));
        assert!(rt.conforms(&enum_class, m.e_classifier));
        assert!(rt.conforms(&enum_class, m.e_object));
        assert!(!rt.conforms(&enum_class, m.e_structural_feature));
        assert!(!rt.conforms(&Value::Int(3), m.e_class));
    }
}
