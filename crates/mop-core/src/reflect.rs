//! Reflective feature access
//!
//! `get`, `set` and `unset` address a feature either by name (resolved
//! through the live type hierarchy) or by descriptor handle. Names the schema
//! does not know fall back to an untyped per-instance side table, subject to
//! [`AdHocPolicy`](crate::AdHocPolicy).

use std::fmt;

use crate::notify::{Notification, NotificationKind};
use crate::object::Slot;
use crate::options::AdHocPolicy;
use crate::value::{CollectionRef, ObjectId, Value};
use crate::{MopError, MopResult, Runtime};

/// Feature address: a name or a descriptor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureRef<'a> {
    /// Feature name, resolved on the instance's class
    Name(&'a str),
    /// Feature descriptor
    Descriptor(ObjectId),
}

impl<'a> From<&'a str> for FeatureRef<'a> {
    fn from(name: &'a str) -> Self {
        FeatureRef::Name(name)
    }
}

impl<'a> From<&'a String> for FeatureRef<'a> {
    fn from(name: &'a String) -> Self {
        FeatureRef::Name(name)
    }
}

impl From<ObjectId> for FeatureRef<'_> {
    fn from(id: ObjectId) -> Self {
        FeatureRef::Descriptor(id)
    }
}

impl fmt::Display for FeatureRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureRef::Name(name) => write!(f, "{}", name),
            FeatureRef::Descriptor(id) => write!(f, "{}", id),
        }
    }
}

impl Runtime {
    /// Resolve a feature address on an instance; `None` if the schema has no such feature
    pub fn resolve_feature<'a>(
        &self,
        obj: ObjectId,
        feature: impl Into<FeatureRef<'a>>,
    ) -> MopResult<Option<ObjectId>> {
        let class = self.class_of(obj)?;
        Ok(match feature.into() {
            FeatureRef::Name(name) => self.find_feature(class, name),
            FeatureRef::Descriptor(id) => Some(id).filter(|f| self.has_feature(class, *f)),
        })
    }

    fn unknown_feature(&self, obj: ObjectId, feature: FeatureRef<'_>) -> MopError {
        let class = self
            .heap
            .try_get(obj)
            .map(|d| self.display_name(d.class))
            .unwrap_or_else(|| obj.to_string());
        let feature = match feature {
            FeatureRef::Name(name) => name.to_string(),
            FeatureRef::Descriptor(id) => self.display_name(id),
        };
        MopError::UnknownFeature { class, feature }
    }

    /// Read a feature
    ///
    /// Multi-valued features return their collection (always the same one
    /// for a given instance and feature). Unassigned scalars return the
    /// feature's default without marking it explicitly set.
    pub fn get<'a>(&mut self, obj: ObjectId, feature: impl Into<FeatureRef<'a>>) -> MopResult<Value> {
        let feature = feature.into();
        let Some(resolved) = self.resolve_feature(obj, feature)? else {
            if let FeatureRef::Name(name) = feature {
                if let Some(value) = self.heap.get(obj)?.ad_hoc.get(name) {
                    return Ok(value.clone());
                }
            }
            return Err(self.unknown_feature(obj, feature));
        };

        if self.is_many(resolved) {
            self.ensure_collection(obj, resolved);
            return Ok(Value::Collection(CollectionRef {
                owner: obj,
                feature: resolved,
            }));
        }
        let value = match self.heap.get(obj)?.slot(resolved) {
            Some(Slot::Single(value)) => Some(value.clone()),
            Some(Slot::Many(items)) => items.get(0).cloned(),
            None => None,
        };
        Ok(value.unwrap_or_else(|| self.default_value(resolved)))
    }

    /// Read a feature without materializing anything
    ///
    /// Multi-valued features are returned as a detached `List` snapshot.
    pub fn peek<'a>(&self, obj: ObjectId, feature: impl Into<FeatureRef<'a>>) -> MopResult<Value> {
        let feature = feature.into();
        let data = self.heap.get(obj)?;
        let Some(resolved) = self.resolve_feature(obj, feature)? else {
            if let FeatureRef::Name(name) = feature {
                if let Some(value) = data.ad_hoc.get(name) {
                    return Ok(value.clone());
                }
            }
            return Err(self.unknown_feature(obj, feature));
        };
        Ok(match data.slot(resolved) {
            Some(Slot::Many(items)) => Value::List(items.items().to_vec()),
            Some(Slot::Single(value)) if !self.is_many(resolved) => value.clone(),
            _ if self.is_many(resolved) => Value::List(Vec::new()),
            _ => self.default_value(resolved),
        })
    }

    /// Assign a feature
    ///
    /// Checks conformance to the feature type, stores the value, notifies
    /// observers, records the feature as explicitly set and, for references,
    /// updates containment and opposites. A multi-valued feature only
    /// accepts its own collection.
    pub fn set<'a>(
        &mut self,
        obj: ObjectId,
        feature: impl Into<FeatureRef<'a>>,
        value: impl Into<Value>,
    ) -> MopResult<()> {
        let feature = feature.into();
        let value = value.into();
        let Some(resolved) = self.resolve_feature(obj, feature)? else {
            return match (feature, self.options.ad_hoc) {
                (FeatureRef::Name(name), AdHocPolicy::Allow) => {
                    self.heap.get_mut(obj)?.ad_hoc.insert(name.to_string(), value);
                    Ok(())
                }
                _ => Err(self.unknown_feature(obj, feature)),
            };
        };

        if self.is_many(resolved) {
            return self.reassign_collection(obj, resolved, value);
        }

        self.check_value(obj, resolved, &value)?;

        let data = self.heap.get_mut(obj)?;
        let ready = data.ready;
        let old = data.store(resolved, value.clone());
        if ready {
            data.explicitly_set.insert(resolved);
        }

        let kind = if value.is_null() {
            NotificationKind::Unset
        } else {
            NotificationKind::Set
        };
        let mut pending = vec![Notification::new(obj, resolved, kind, old.clone(), value.clone())];
        if ready && self.is_reference(resolved) {
            self.propagate_scalar(obj, resolved, &old, &value, &mut pending);
        }
        self.commit(obj, resolved, pending)
    }

    /// Assigning a collection feature its own collection is accepted as a no-op store
    fn reassign_collection(&mut self, obj: ObjectId, feature: ObjectId, value: Value) -> MopResult<()> {
        let own = CollectionRef {
            owner: obj,
            feature,
        };
        if value.as_collection() != Some(own) {
            return Err(MopError::TypeConformance {
                expected: format!("{}[*]", self.display_name(feature)),
                found: self.describe(&value),
            });
        }
        self.ensure_collection(obj, feature);
        let data = self.heap.get_mut(obj)?;
        if data.ready {
            data.explicitly_set.insert(feature);
        }
        let pending = vec![Notification::new(
            obj,
            feature,
            NotificationKind::Set,
            value.clone(),
            value,
        )];
        self.commit(obj, feature, pending)
    }

    /// Reset a feature to its default and clear its explicit-set flag
    ///
    /// Collections are emptied element by element, with full propagation.
    pub fn unset<'a>(&mut self, obj: ObjectId, feature: impl Into<FeatureRef<'a>>) -> MopResult<()> {
        let feature = feature.into();
        let Some(resolved) = self.resolve_feature(obj, feature)? else {
            if let FeatureRef::Name(name) = feature {
                if self.heap.get_mut(obj)?.ad_hoc.remove(name).is_some() {
                    return Ok(());
                }
            }
            return Err(self.unknown_feature(obj, feature));
        };

        if self.is_many(resolved) {
            self.clear(CollectionRef {
                owner: obj,
                feature: resolved,
            })?;
            self.heap.get_mut(obj)?.explicitly_set.remove(&resolved);
            return Ok(());
        }

        let default = self.default_value(resolved);
        let data = self.heap.get_mut(obj)?;
        let ready = data.ready;
        let old = data.store(resolved, default.clone());
        data.explicitly_set.remove(&resolved);

        let mut pending = vec![Notification::new(
            obj,
            resolved,
            NotificationKind::Unset,
            old.clone(),
            default.clone(),
        )];
        if ready && self.is_reference(resolved) {
            self.propagate_scalar(obj, resolved, &old, &default, &mut pending);
        }
        self.commit(obj, resolved, pending)
    }

    /// Whether a feature was explicitly assigned
    pub fn is_feature_set<'a>(&self, obj: ObjectId, feature: impl Into<FeatureRef<'a>>) -> MopResult<bool> {
        let feature = feature.into();
        match self.resolve_feature(obj, feature)? {
            Some(resolved) => self.is_set(obj, resolved),
            None => Err(self.unknown_feature(obj, feature)),
        }
    }

    /// Names stored in the ad-hoc side table, sorted
    pub fn ad_hoc_names(&self, obj: ObjectId) -> MopResult<Vec<String>> {
        let mut names: Vec<String> = self.heap.get(obj)?.ad_hoc.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FeatureDefinition;

    fn person(rt: &mut Runtime) -> (ObjectId, ObjectId) {
        let class = rt.create_class("Person").unwrap();
        let string = rt.meta().e_string;
        let name = rt
            .define_feature(class, FeatureDefinition::attribute("name", string))
            .unwrap();
        (class, name)
    }

    #[test]
    fn test_get_default_does_not_mark_set() {
        let mut rt = Runtime::new();
        let (class, name) = person(&mut rt);
        let p = rt.instantiate(class).unwrap();
        assert_eq!(rt.get(p, "name").unwrap(), Value::Null);
        assert!(!rt.is_set(p, name).unwrap());
        rt.set(p, "name", "Ada").unwrap();
        assert!(rt.is_set(p, name).unwrap());
        assert_eq!(rt.get(p, name).unwrap(), Value::string("Ada"));
    }

    #[test]
    fn test_set_rejects_nonconforming_value() {
        let mut rt = Runtime::new();
        let (class, _) = person(&mut rt);
        let p = rt.instantiate(class).unwrap();
        let err = rt.set(p, "name", 42i64).unwrap_err();
        assert!(matches!(err, MopError::TypeConformance { ref expected, .. } if expected == "EString"));
        assert_eq!(rt.get(p, "name").unwrap(), Value::Null);
    }

    #[test]
    fn test_ad_hoc_round_trip() {
        let mut rt = Runtime::new();
        let (class, _) = person(&mut rt);
        let p = rt.instantiate(class).unwrap();
        rt.set(p, "nickname", "Addie").unwrap();
        assert_eq!(rt.get(p, "nickname").unwrap(), Value::string("Addie"));
        assert_eq!(rt.ad_hoc_names(p).unwrap(), vec!["nickname".to_string()]);
        rt.unset(p, "nickname").unwrap();
        assert!(matches!(rt.get(p, "nickname"), Err(MopError::UnknownFeature { .. })));
    }

    #[test]
    fn test_ad_hoc_rejected_by_policy() {
        let mut rt = Runtime::with_options(
            crate::RuntimeOptions::default().with_ad_hoc(AdHocPolicy::Reject),
        );
        let (class, _) = person(&mut rt);
        let p = rt.instantiate(class).unwrap();
        assert!(matches!(
            rt.set(p, "nickname", "Addie"),
            Err(MopError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn test_unset_restores_default() {
        let mut rt = Runtime::new();
        let class = rt.create_class("Counter").unwrap();
        let int = rt.meta().e_int;
        let count = rt
            .define_feature(
                class,
                FeatureDefinition::attribute("count", int).default_value(Value::Int(5)),
            )
            .unwrap();
        let c = rt.instantiate(class).unwrap();
        assert_eq!(rt.get(c, count).unwrap(), Value::Int(5));
        rt.set(c, count, 9i64).unwrap();
        rt.unset(c, count).unwrap();
        assert_eq!(rt.get(c, count).unwrap(), Value::Int(5));
        assert!(!rt.is_set(c, count).unwrap());
    }

    #[test]
    fn test_peek_does_not_materialize() {
        let mut rt = Runtime::new();
        let (class, name) = person(&mut rt);
        let p = rt.instantiate(class).unwrap();
        rt.set(p, name, "Ada").unwrap();
        assert_eq!(rt.peek(p, "name").unwrap(), Value::string("Ada"));
        let m = *rt.meta();
        assert_eq!(
            rt.peek(class, m.class_super_types).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_set_many_requires_own_collection() {
        let mut rt = Runtime::new();
        let m = *rt.meta();
        let a = rt.create_class("A").unwrap();
        let b = rt.create_class("B").unwrap();
        let own = rt.get(a, "eSuperTypes").unwrap();
        rt.set(a, m.class_super_types, own).unwrap();
        let other = rt.get(b, "eSuperTypes").unwrap();
        assert!(matches!(
            rt.set(a, m.class_super_types, other),
            Err(MopError::TypeConformance { .. })
        ));
    }

    #[test]
    fn test_descriptor_of_foreign_class_is_unknown() {
        let mut rt = Runtime::new();
        let (class, _) = person(&mut rt);
        let other = rt.create_class("Other").unwrap();
        let string = rt.meta().e_string;
        let code = rt
            .define_feature(other, FeatureDefinition::attribute("code", string))
            .unwrap();
        let p = rt.instantiate(class).unwrap();
        assert!(matches!(rt.get(p, code), Err(MopError::UnknownFeature { .. })));
        assert!(matches!(rt.set(p, code, "x"), Err(MopError::UnknownFeature { .. })));
    }
}
