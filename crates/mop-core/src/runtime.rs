//! Runtime context
//!
//! A [`Runtime`] owns every object (meta level included), the classifier
//! registry, data type bindings and operation implementations. Independent
//! runtimes share nothing; [`Runtime::global`] provides a process-wide one.

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, LazyLock};

use crate::gc::GcStats;
use crate::heap::Heap;
use crate::meta::{bootstrap, DataTypeBinding, FeatureHook, MetaIds};
use crate::notify::{Notification, Observer, ObserverId};
use crate::object::{ObjectData, Slot};
use crate::operations::OperationHandler;
use crate::options::RuntimeOptions;
use crate::registry::ClassifierRegistry;
use crate::value::{ObjectId, UnitHandle, Value};
use crate::MopResult;

static GLOBAL_RUNTIME: LazyLock<Mutex<Runtime>> = LazyLock::new(|| Mutex::new(Runtime::new()));

/// Meta-object protocol runtime
pub struct Runtime {
    pub(crate) heap: Heap,
    pub(crate) registry: ClassifierRegistry,
    pub(crate) meta: MetaIds,
    pub(crate) bindings: FxHashMap<ObjectId, DataTypeBinding>,
    pub(crate) operations: FxHashMap<ObjectId, OperationHandler>,
    pub(crate) hooks: FxHashMap<ObjectId, FeatureHook>,
    /// Supertype closure per class, dropped whenever any `eSuperTypes` changes
    pub(crate) hierarchy: RwLock<FxHashMap<ObjectId, Arc<[ObjectId]>>>,
    pub(crate) pinned: FxHashSet<ObjectId>,
    pub(crate) options: RuntimeOptions,
    pub(crate) gc_stats: GcStats,
    next_observer: u64,
}

impl Runtime {
    /// Create a runtime with default options
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    /// Create a runtime with the given options
    pub fn with_options(options: RuntimeOptions) -> Self {
        let mut rt = Self {
            heap: Heap::with_capacity(options.initial_capacity),
            registry: ClassifierRegistry::new(),
            meta: MetaIds::default(),
            bindings: FxHashMap::default(),
            operations: FxHashMap::default(),
            hooks: FxHashMap::default(),
            hierarchy: RwLock::new(FxHashMap::default()),
            pinned: FxHashSet::default(),
            options,
            gc_stats: GcStats::default(),
            next_observer: 0,
        };
        bootstrap::install(&mut rt);
        rt
    }

    /// Process-wide runtime, bootstrapped on first access
    pub fn global() -> &'static Mutex<Runtime> {
        &GLOBAL_RUNTIME
    }

    /// Handles of the meta-level objects
    pub fn meta(&self) -> &MetaIds {
        &self.meta
    }

    /// Runtime options
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Object arena
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Classifier and package registry
    pub fn registry(&self) -> &ClassifierRegistry {
        &self.registry
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }

    /// Check if a handle refers to a live object
    pub fn is_live(&self, obj: ObjectId) -> bool {
        self.heap.contains(obj)
    }

    /// Storage of a live object
    pub fn object(&self, obj: ObjectId) -> MopResult<&ObjectData> {
        self.heap.get(obj)
    }

    /// Class of an object
    pub fn class_of(&self, obj: ObjectId) -> MopResult<ObjectId> {
        Ok(self.heap.get(obj)?.class)
    }

    // ===== Instance bookkeeping =====

    /// Containing object
    pub fn container(&self, obj: ObjectId) -> MopResult<Option<ObjectId>> {
        Ok(self.heap.get(obj)?.container)
    }

    /// Containment feature of the container holding `obj`
    pub fn containment_feature(&self, obj: ObjectId) -> MopResult<Option<ObjectId>> {
        Ok(self.heap.get(obj)?.containment_feature)
    }

    /// Whether construction has finished
    pub fn is_ready(&self, obj: ObjectId) -> MopResult<bool> {
        Ok(self.heap.get(obj)?.ready)
    }

    /// Whether a feature was assigned through the public path
    pub fn is_set(&self, obj: ObjectId, feature: ObjectId) -> MopResult<bool> {
        Ok(self.heap.get(obj)?.explicitly_set.contains(&feature))
    }

    /// Features assigned through the public path
    pub fn explicitly_set(&self, obj: ObjectId) -> MopResult<Vec<ObjectId>> {
        let data = self.heap.get(obj)?;
        let mut features: Vec<ObjectId> = data.explicitly_set.iter().copied().collect();
        features.sort();
        Ok(features)
    }

    /// Owning persistence unit
    pub fn owning_unit(&self, obj: ObjectId) -> MopResult<Option<UnitHandle>> {
        Ok(self.heap.get(obj)?.owning_unit)
    }

    /// Attach or detach the owning persistence unit
    pub fn set_owning_unit(&mut self, obj: ObjectId, unit: Option<UnitHandle>) -> MopResult<()> {
        self.heap.get_mut(obj)?.owning_unit = unit;
        Ok(())
    }

    /// Collaborator-assigned identifier
    pub fn persistent_id(&self, obj: ObjectId) -> MopResult<Option<&str>> {
        Ok(self.heap.get(obj)?.persistent_id.as_deref())
    }

    /// Assign or clear the collaborator identifier
    pub fn set_persistent_id(&mut self, obj: ObjectId, id: Option<String>) -> MopResult<()> {
        self.heap.get_mut(obj)?.persistent_id = id;
        Ok(())
    }

    // ===== Observers =====

    /// Register an observer on an instance
    pub fn add_observer(
        &mut self,
        obj: ObjectId,
        observer: impl Observer + 'static,
    ) -> MopResult<ObserverId> {
        let data = self.heap.get_mut(obj)?;
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        data.observers.push((id, Box::new(observer)));
        Ok(id)
    }

    /// Unregister an observer; returns false if it was not registered
    pub fn remove_observer(&mut self, obj: ObjectId, observer: ObserverId) -> MopResult<bool> {
        let data = self.heap.get_mut(obj)?;
        let before = data.observers.len();
        data.observers.retain(|(id, _)| *id != observer);
        Ok(data.observers.len() != before)
    }

    /// Deliver notifications in order to the observers of each ready notifier
    pub(crate) fn dispatch(&mut self, notifications: Vec<Notification>) {
        for notification in notifications {
            let Some(data) = self.heap.try_get_mut(notification.notifier) else {
                continue;
            };
            if !data.ready {
                continue;
            }
            for (_, observer) in data.observers.iter_mut() {
                observer.notify_changed(&notification);
            }
        }
    }

    // ===== Raw descriptor reads =====
    //
    // These read slots by feature id and never go through name resolution,
    // which is what keeps meta-circular reads finite.

    pub(crate) fn raw(&self, obj: ObjectId, feature: ObjectId) -> Option<&Value> {
        self.heap.try_get(obj)?.single(feature)
    }

    pub(crate) fn raw_bool(&self, obj: ObjectId, feature: ObjectId) -> Option<bool> {
        self.raw(obj, feature).and_then(Value::as_bool)
    }

    pub(crate) fn raw_int(&self, obj: ObjectId, feature: ObjectId) -> Option<i64> {
        self.raw(obj, feature).and_then(Value::as_int)
    }

    pub(crate) fn raw_str(&self, obj: ObjectId, feature: ObjectId) -> Option<&str> {
        self.raw(obj, feature).and_then(Value::as_str)
    }

    pub(crate) fn raw_object(&self, obj: ObjectId, feature: ObjectId) -> Option<ObjectId> {
        self.raw(obj, feature).and_then(Value::as_object)
    }

    pub(crate) fn raw_items(&self, obj: ObjectId, feature: ObjectId) -> &[Value] {
        self.heap
            .try_get(obj)
            .and_then(|d| d.collection(feature))
            .map(|c| c.items())
            .unwrap_or(&[])
    }

    pub(crate) fn raw_objects(&self, obj: ObjectId, feature: ObjectId) -> Vec<ObjectId> {
        self.raw_items(obj, feature)
            .iter()
            .filter_map(Value::as_object)
            .collect()
    }

    /// Name of a named element, or its handle when unnamed
    pub fn display_name(&self, obj: ObjectId) -> String {
        match self.raw_str(obj, self.meta.named_element_name) {
            Some(name) => name.to_string(),
            None => obj.to_string(),
        }
    }

    /// Human-readable description of a value, for diagnostics
    pub(crate) fn describe(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => match self.heap.try_get(*id) {
                Some(data) => format!("instance of {} ({})", self.display_name(data.class), id),
                None => format!("dangling object {}", id),
            },
            Value::String(s) => format!("string {:?}", s),
            other => format!("{} {}", other.kind_name(), other),
        }
    }

    // ===== Construction support =====

    /// Fill every feature slot not yet present with its default
    pub(crate) fn materialize_defaults(&mut self, obj: ObjectId) {
        let Some(class) = self.heap.try_get(obj).map(|d| d.class) else {
            return;
        };
        let mut missing = Vec::new();
        for feature in self.all_features(class) {
            let present = self
                .heap
                .try_get(obj)
                .is_some_and(|d| d.slots.contains_key(&feature));
            if present {
                continue;
            }
            let slot = if self.is_many(feature) {
                Slot::Many(crate::collection::Collection::new(self.collection_kind(feature)))
            } else {
                Slot::Single(self.default_value(feature))
            };
            missing.push((feature, slot));
        }
        if let Some(data) = self.heap.try_get_mut(obj) {
            data.slots.extend(missing);
        }
    }

    /// Drop cached supertype closures
    pub(crate) fn invalidate_hierarchy(&self) {
        self.hierarchy.write().clear();
    }

    /// Apply per-feature hooks after a mutation of `feature`
    pub(crate) fn after_mutation(&self, owner: ObjectId, feature: ObjectId) {
        let invalidates = self
            .hooks
            .get(&feature)
            .is_some_and(|h| h.invalidates_hierarchy);
        if invalidates {
            tracing::debug!(class = %self.display_name(owner), "Supertypes changed");
            self.invalidate_hierarchy();
        }
    }

    /// Run a feature's validation hook, if any
    pub(crate) fn run_hook(&self, owner: ObjectId, feature: ObjectId, value: &Value) -> MopResult<()> {
        match self.hooks.get(&feature).and_then(|h| h.validate) {
            Some(check) => check(self, owner, value),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("heap", &self.heap)
            .field("classifiers", &self.registry.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationLog;

    #[test]
    fn test_bootstrap_meta_circularity() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.class_of(m.e_class).unwrap(), m.e_class);
        assert_eq!(rt.class_of(m.e_string).unwrap(), m.e_data_type);
        assert_eq!(rt.class_of(m.reference_opposite).unwrap(), m.e_reference);
        assert_eq!(rt.class_of(m.named_element_name).unwrap(), m.e_attribute);
        assert_eq!(rt.class_of(m.ecore_package).unwrap(), m.e_package);
    }

    #[test]
    fn test_display_name() {
        let rt = Runtime::new();
        assert_eq!(rt.display_name(rt.meta().e_class), "EClass");
        assert_eq!(rt.display_name(rt.meta().named_element_name), "name");
    }

    #[test]
    fn test_observer_registration() {
        let mut rt = Runtime::new();
        let m = *rt.meta();
        let log = NotificationLog::new();
        let id = rt.add_observer(m.e_class, log.clone()).unwrap();
        assert_eq!(rt.object(m.e_class).unwrap().observer_count(), 1);
        assert!(rt.remove_observer(m.e_class, id).unwrap());
        assert!(!rt.remove_observer(m.e_class, id).unwrap());
    }

    #[test]
    fn test_bookkeeping_accessors() {
        let mut rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.container(m.e_class).unwrap(), Some(m.ecore_package));
        assert_eq!(
            rt.containment_feature(m.e_class).unwrap(),
            Some(m.package_classifiers)
        );
        rt.set_owning_unit(m.e_class, Some(UnitHandle(7))).unwrap();
        assert_eq!(rt.owning_unit(m.e_class).unwrap(), Some(UnitHandle(7)));
        rt.set_persistent_id(m.e_class, Some("EClass".into())).unwrap();
        assert_eq!(rt.persistent_id(m.e_class).unwrap(), Some("EClass"));
    }

    #[test]
    fn test_global_runtime_is_bootstrapped() {
        let rt = Runtime::global().lock();
        let m = *rt.meta();
        assert_eq!(rt.class_of(m.e_class).unwrap(), m.e_class);
    }
}
