//! Instance storage

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use crate::collection::Collection;
use crate::notify::{Observer, ObserverId};
use crate::value::{ObjectId, UnitHandle, Value};

/// Storage for one feature on one instance
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Single-valued feature
    Single(Value),
    /// Multi-valued feature
    Many(Collection),
}

/// Data of one object in the arena
///
/// Instances, classes, features and enum literals all share this layout; a
/// descriptor is simply an object whose class is a meta-class.
pub struct ObjectData {
    /// Class this object is an instance of
    pub(crate) class: ObjectId,
    /// Feature descriptor -> slot
    pub(crate) slots: FxHashMap<ObjectId, Slot>,
    /// Values assigned under names the schema does not know
    pub(crate) ad_hoc: FxHashMap<String, Value>,
    /// Object containing this one
    pub(crate) container: Option<ObjectId>,
    /// Containment feature of the container holding this object
    pub(crate) containment_feature: Option<ObjectId>,
    /// Features assigned through the public path since construction
    pub(crate) explicitly_set: FxHashSet<ObjectId>,
    /// Construction finished
    pub(crate) ready: bool,
    /// Persistence unit owning this object
    pub(crate) owning_unit: Option<UnitHandle>,
    /// Identifier assigned by a persistence collaborator
    pub(crate) persistent_id: Option<String>,
    /// Registered observers, in registration order
    pub(crate) observers: Vec<(ObserverId, Box<dyn Observer>)>,
}

impl ObjectData {
    /// Create empty, not-ready storage for an instance of `class`
    pub fn new(class: ObjectId) -> Self {
        Self {
            class,
            slots: FxHashMap::default(),
            ad_hoc: FxHashMap::default(),
            container: None,
            containment_feature: None,
            explicitly_set: FxHashSet::default(),
            ready: false,
            owning_unit: None,
            persistent_id: None,
            observers: Vec::new(),
        }
    }

    /// Class this object is an instance of
    pub fn class(&self) -> ObjectId {
        self.class
    }

    /// Whether construction has finished
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Containing object
    pub fn container(&self) -> Option<ObjectId> {
        self.container
    }

    /// Containment feature holding this object
    pub fn containment_feature(&self) -> Option<ObjectId> {
        self.containment_feature
    }

    /// Owning persistence unit
    pub fn owning_unit(&self) -> Option<UnitHandle> {
        self.owning_unit
    }

    /// Collaborator-assigned identifier
    pub fn persistent_id(&self) -> Option<&str> {
        self.persistent_id.as_deref()
    }

    /// Whether the feature was assigned through the public path
    pub fn is_explicitly_set(&self, feature: ObjectId) -> bool {
        self.explicitly_set.contains(&feature)
    }

    /// Raw slot for a feature, if materialized
    pub fn slot(&self, feature: ObjectId) -> Option<&Slot> {
        self.slots.get(&feature)
    }

    /// Ad-hoc value stored under a name
    pub fn ad_hoc(&self, name: &str) -> Option<&Value> {
        self.ad_hoc.get(name)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn single(&self, feature: ObjectId) -> Option<&Value> {
        match self.slots.get(&feature) {
            Some(Slot::Single(v)) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn collection(&self, feature: ObjectId) -> Option<&Collection> {
        match self.slots.get(&feature) {
            Some(Slot::Many(c)) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn collection_mut(&mut self, feature: ObjectId) -> Option<&mut Collection> {
        match self.slots.get_mut(&feature) {
            Some(Slot::Many(c)) => Some(c),
            _ => None,
        }
    }

    /// Store a scalar, returning the previous value (`Null` if none)
    pub(crate) fn store(&mut self, feature: ObjectId, value: Value) -> Value {
        match self.slots.insert(feature, Slot::Single(value)) {
            Some(Slot::Single(old)) => old,
            _ => Value::Null,
        }
    }

    /// Every value reachable from this object's slots, for tracing
    pub(crate) fn for_each_value(&self, mut f: impl FnMut(&Value)) {
        for slot in self.slots.values() {
            match slot {
                Slot::Single(v) => f(v),
                Slot::Many(c) => c.iter().for_each(&mut f),
            }
        }
        self.ad_hoc.values().for_each(f);
    }
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectData")
            .field("class", &self.class)
            .field("slots", &self.slots.len())
            .field("container", &self.container)
            .field("ready", &self.ready)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionKind;

    #[test]
    fn test_store_returns_previous() {
        let feature = ObjectId::new(1, 0);
        let mut data = ObjectData::new(ObjectId::new(0, 0));
        assert_eq!(data.store(feature, Value::Int(1)), Value::Null);
        assert_eq!(data.store(feature, Value::Int(2)), Value::Int(1));
        assert_eq!(data.single(feature), Some(&Value::Int(2)));
        assert!(data.collection(feature).is_none());
    }

    #[test]
    fn test_for_each_value_visits_all_slots() {
        let mut data = ObjectData::new(ObjectId::new(0, 0));
        data.store(ObjectId::new(1, 0), Value::Int(1));
        data.slots.insert(
            ObjectId::new(2, 0),
            Slot::Many(Collection::from_items(
                CollectionKind::OrderedUnique,
                vec![Value::Int(2), Value::Int(3)],
            )),
        );
        data.ad_hoc.insert("extra".to_string(), Value::Int(4));

        let mut seen = Vec::new();
        data.for_each_value(|v| seen.push(v.clone()));
        seen.sort_by_key(|v| v.as_int());
        assert_eq!(
            seen,
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn test_new_is_not_ready() {
        let data = ObjectData::new(ObjectId::new(0, 0));
        assert!(!data.is_ready());
        assert!(data.container().is_none());
        assert_eq!(data.observer_count(), 0);
    }
}
