//! Type descriptor operations
//!
//! Feature lookup, supertype closure and instantiation. Supertype closures
//! are cached per class and the cache is dropped whenever any class's
//! `eSuperTypes` changes, so lookups always see the live hierarchy.

use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::trace;

use crate::object::ObjectData;
use crate::value::{CollectionRef, ObjectId, Value};
use crate::{MopError, MopResult, Runtime};

impl Runtime {
    /// Transitive supertypes of a class, depth-first in declaration order
    pub(crate) fn super_type_closure(&self, class: ObjectId) -> Arc<[ObjectId]> {
        if let Some(closure) = self.hierarchy.read().get(&class) {
            return closure.clone();
        }
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(class);
        self.collect_super_types(class, &mut seen, &mut out);
        let closure: Arc<[ObjectId]> = out.into();
        self.hierarchy.write().insert(class, closure.clone());
        closure
    }

    fn collect_super_types(
        &self,
        class: ObjectId,
        seen: &mut FxHashSet<ObjectId>,
        out: &mut Vec<ObjectId>,
    ) {
        for super_type in self.super_types(class) {
            if seen.insert(super_type) {
                out.push(super_type);
                self.collect_super_types(super_type, seen, out);
            }
        }
    }

    /// All supertypes of a class, transitively
    pub fn all_super_types(&self, class: ObjectId) -> Vec<ObjectId> {
        self.super_type_closure(class).to_vec()
    }

    /// Whether `class` is `target`, a subclass of it, or `target` is `EObject`
    pub fn is_kind_of(&self, class: ObjectId, target: ObjectId) -> bool {
        class == target
            || target == self.meta.e_object
            || self.super_type_closure(class).contains(&target)
    }

    /// Whether `super_type` is `class` or one of its transitive supertypes
    pub fn is_super_type_of(&self, super_type: ObjectId, class: ObjectId) -> bool {
        class == super_type || self.super_type_closure(class).contains(&super_type)
    }

    /// Find a feature by name on a class or its supertypes
    pub fn find_feature(&self, class: ObjectId, name: &str) -> Option<ObjectId> {
        let named = |f: &ObjectId| self.name(*f) == Some(name);
        if let Some(found) = self.structural_features(class).into_iter().find(named) {
            return Some(found);
        }
        self.super_type_closure(class)
            .iter()
            .find_map(|s| self.structural_features(*s).into_iter().find(named))
    }

    /// Every feature of a class, own features first
    pub fn all_features(&self, class: ObjectId) -> Vec<ObjectId> {
        let mut features = self.structural_features(class);
        for super_type in self.super_type_closure(class).iter() {
            for feature in self.structural_features(*super_type) {
                if !features.contains(&feature) {
                    features.push(feature);
                }
            }
        }
        features
    }

    /// Every attribute of a class, inherited included
    pub fn all_attributes(&self, class: ObjectId) -> Vec<ObjectId> {
        self.all_features(class)
            .into_iter()
            .filter(|f| self.is_attribute(*f))
            .collect()
    }

    /// Every reference of a class, inherited included
    pub fn all_references(&self, class: ObjectId) -> Vec<ObjectId> {
        self.all_features(class)
            .into_iter()
            .filter(|f| self.is_reference(*f))
            .collect()
    }

    /// Every containment reference of a class, inherited included
    pub fn all_containments(&self, class: ObjectId) -> Vec<ObjectId> {
        self.all_features(class)
            .into_iter()
            .filter(|f| self.is_reference(*f) && self.is_containment(*f))
            .collect()
    }

    /// Whether a feature descriptor belongs to a class or its supertypes
    pub fn has_feature(&self, class: ObjectId, feature: ObjectId) -> bool {
        self.containing_class(feature)
            .is_some_and(|owner| self.is_super_type_of(owner, class))
    }

    /// Find an operation by name on a class or its supertypes
    pub fn find_operation(&self, class: ObjectId, name: &str) -> Option<ObjectId> {
        let named = |op: &ObjectId| self.name(*op) == Some(name);
        if let Some(found) = self.declared_operations(class).into_iter().find(named) {
            return Some(found);
        }
        self.super_type_closure(class)
            .iter()
            .find_map(|s| self.declared_operations(*s).into_iter().find(named))
    }

    /// Every operation of a class, own operations first
    pub fn all_operations(&self, class: ObjectId) -> Vec<ObjectId> {
        let mut operations = self.declared_operations(class);
        for super_type in self.super_type_closure(class).iter() {
            operations.extend(self.declared_operations(*super_type));
        }
        operations
    }

    /// Live objects whose class is `class` or a subclass of it
    pub fn all_instances(&self, class: ObjectId) -> Vec<ObjectId> {
        self.heap
            .iter()
            .filter(|(_, data)| self.is_kind_of(data.class, class))
            .map(|(id, _)| id)
            .collect()
    }

    /// Create an instance of a concrete class
    ///
    /// Every feature slot is default-filled before the instance is marked
    /// ready, so construction produces no notifications and no explicit-set
    /// entries.
    pub fn instantiate(&mut self, class: ObjectId) -> MopResult<ObjectId> {
        if !self.is_class(class) {
            return Err(MopError::TypeConformance {
                expected: "EClass".to_string(),
                found: self.describe(&Value::Object(class)),
            });
        }
        if self.is_abstract(class) || self.is_interface(class) {
            return Err(MopError::AbstractType {
                class: self.display_name(class),
            });
        }

        let id = self.heap.allocate(ObjectData::new(class));
        self.materialize_defaults(id);
        self.heap.get_mut(id)?.ready = true;

        trace!(class = %self.display_name(class), %id, "Instantiated");
        Ok(id)
    }

    /// Append a direct supertype; rejected if it would create a cycle
    pub fn add_super_type(&mut self, class: ObjectId, super_type: ObjectId) -> MopResult<bool> {
        let supers = CollectionRef {
            owner: class,
            feature: self.meta.class_super_types,
        };
        self.add(supers, Value::Object(super_type))
    }

    /// Remove a direct supertype
    pub fn remove_super_type(&mut self, class: ObjectId, super_type: ObjectId) -> MopResult<bool> {
        let supers = CollectionRef {
            owner: class,
            feature: self.meta.class_super_types,
        };
        self.remove(supers, &Value::Object(super_type))
    }
}

/// Validation hook for `EClass.eSuperTypes`
pub(crate) fn check_super_type(rt: &Runtime, class: ObjectId, value: &Value) -> MopResult<()> {
    let Some(super_type) = value.as_object() else {
        return Ok(());
    };
    if super_type == class || rt.super_type_closure(super_type).contains(&class) {
        return Err(MopError::CyclicSupertype {
            class: rt.display_name(class),
            supertype: rt.display_name(super_type),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_closure() {
        let rt = Runtime::new();
        let m = *rt.meta();
        let closure = rt.all_super_types(m.e_attribute);
        assert_eq!(
            closure,
            vec![
                m.e_structural_feature,
                m.e_typed_element,
                m.e_named_element,
                m.e_model_element
            ]
        );
        assert!(rt.is_super_type_of(m.e_classifier, m.e_enum));
        assert!(rt.is_super_type_of(m.e_enum, m.e_enum));
        assert!(!rt.is_super_type_of(m.e_enum, m.e_classifier));
    }

    #[test]
    fn test_find_meta_feature() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.find_feature(m.e_class, "name"), Some(m.named_element_name));
        assert_eq!(rt.find_feature(m.e_class, "eSuperTypes"), Some(m.class_super_types));
        assert_eq!(rt.find_feature(m.e_class, "containment"), None);
        assert!(rt.has_feature(m.e_reference, m.typed_element_type));
        assert!(!rt.has_feature(m.e_attribute, m.reference_containment));
    }

    #[test]
    fn test_instantiate_abstract_rejected() {
        let mut rt = Runtime::new();
        let m = *rt.meta();
        let err = rt.instantiate(m.e_classifier).unwrap_err();
        assert_eq!(
            err,
            MopError::AbstractType {
                class: "EClassifier".to_string()
            }
        );
    }

    #[test]
    fn test_instantiate_non_class_rejected() {
        let mut rt = Runtime::new();
        let m = *rt.meta();
        assert!(matches!(
            rt.instantiate(m.e_string),
            Err(MopError::TypeConformance { .. })
        ));
    }

    #[test]
    fn test_cache_sees_new_super_type() {
        let mut rt = Runtime::new();
        let base = rt.create_class("Base").unwrap();
        let derived = rt.create_class("Derived").unwrap();
        assert!(rt.all_super_types(derived).is_empty());
        rt.add_super_type(derived, base).unwrap();
        assert_eq!(rt.all_super_types(derived), vec![base]);
        rt.remove_super_type(derived, base).unwrap();
        assert!(rt.all_super_types(derived).is_empty());
    }

    #[test]
    fn test_cycle_rejected() {
        let mut rt = Runtime::new();
        let a = rt.create_class("A").unwrap();
        let b = rt.create_class("B").unwrap();
        rt.add_super_type(b, a).unwrap();
        assert!(matches!(
            rt.add_super_type(a, b),
            Err(MopError::CyclicSupertype { .. })
        ));
        assert!(matches!(
            rt.add_super_type(a, a),
            Err(MopError::CyclicSupertype { .. })
        ));
        assert!(rt.super_types(a).is_empty());
    }
}
