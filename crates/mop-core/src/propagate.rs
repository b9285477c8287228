//! Reference consistency
//!
//! Keeps containment bookkeeping and opposite references consistent when a
//! reference changes. Every entrypoint here writes the other side directly
//! and never re-enters the public assignment path, so a change propagates
//! exactly one hop.
//!
//! Notifications are appended to a caller-supplied buffer and delivered by
//! the caller once the whole mutation has been applied.

use rustc_hash::FxHashMap;

use crate::collection::Collection;
use crate::notify::{Notification, NotificationKind};
use crate::object::Slot;
use crate::value::{ObjectId, Value};
use crate::{MopResult, Runtime};

impl Runtime {
    /// Propagate a scalar reference change from `old` to `new` on `owner.feature`
    pub(crate) fn propagate_scalar(
        &mut self,
        owner: ObjectId,
        feature: ObjectId,
        old: &Value,
        new: &Value,
        pending: &mut Vec<Notification>,
    ) {
        if old == new {
            return;
        }
        if let Some(previous) = old.as_object() {
            self.detach(owner, feature, previous, true, pending);
        }
        if let Some(target) = new.as_object() {
            self.attach(owner, feature, target, pending);
        }
    }

    /// `owner.feature` now refers to `target`: adopt it and link its opposite
    pub(crate) fn attach(
        &mut self,
        owner: ObjectId,
        feature: ObjectId,
        target: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        if self.is_containment(feature) {
            self.adopt_child(owner, feature, target, pending);
        }
        if let Some(opposite) = self.opposite(feature) {
            // a self-opposite feature pointing at its own owner is one link
            if !(target == owner && opposite == feature) {
                self.link(target, opposite, owner, pending);
            }
        }
    }

    /// `owner.feature` no longer refers to `target`: release it and unlink its opposite
    ///
    /// Nothing happens unless `last` is set: while a list still holds
    /// another occurrence of `target`, both sides keep the link.
    pub(crate) fn detach(
        &mut self,
        owner: ObjectId,
        feature: ObjectId,
        target: ObjectId,
        last: bool,
        pending: &mut Vec<Notification>,
    ) {
        if !last {
            return;
        }
        if self.is_containment(feature) {
            self.release_child(target, owner, feature);
        }
        if let Some(opposite) = self.opposite(feature) {
            if !(target == owner && opposite == feature) {
                self.unlink(target, opposite, owner, pending);
            }
        }
    }

    /// Make `parent.feature` the container of `child`, detaching it from any other container
    pub(crate) fn adopt_child(
        &mut self,
        parent: ObjectId,
        feature: ObjectId,
        child: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        let Some(data) = self.heap.try_get(child) else {
            return;
        };
        if let (Some(old_parent), Some(old_feature)) = (data.container, data.containment_feature) {
            if (old_parent, old_feature) != (parent, feature) {
                self.remove_from_container(child, old_parent, old_feature, pending);
            }
        }
        if let Some(data) = self.heap.try_get_mut(child) {
            data.container = Some(parent);
            data.containment_feature = Some(feature);
        }
    }

    /// Clear `child`'s container if it is `parent.feature`
    pub(crate) fn release_child(&mut self, child: ObjectId, parent: ObjectId, feature: ObjectId) {
        if let Some(data) = self.heap.try_get_mut(child) {
            if data.container == Some(parent) && data.containment_feature == Some(feature) {
                data.container = None;
                data.containment_feature = None;
            }
        }
    }

    /// Take `child` out of its current container's slot and unlink the container side
    fn remove_from_container(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        feature: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        self.clear_reference(parent, feature, child, pending);
        if let Some(opposite) = self.opposite(feature) {
            self.clear_reference(child, opposite, parent, pending);
        }
        self.release_child(child, parent, feature);
    }

    /// Add `source` to `target.feature` without re-propagating to `source`
    ///
    /// A single-valued `target.feature` that held another object displaces
    /// it; the displaced object's own back-reference to `target` is cleared.
    pub(crate) fn link(
        &mut self,
        target: ObjectId,
        feature: ObjectId,
        source: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        if !self.heap.contains(target) {
            return;
        }
        let source_value = Value::Object(source);

        if self.is_many(feature) {
            self.ensure_collection(target, feature);
            let Some(data) = self.heap.try_get_mut(target) else {
                return;
            };
            let Some(collection) = data.collection_mut(feature) else {
                return;
            };
            if collection.push(source_value.clone()) {
                let position = collection.len() - 1;
                pending.push(
                    Notification::new(target, feature, NotificationKind::Add, Value::Null, source_value)
                        .at(position),
                );
            }
        } else {
            let previous = self
                .heap
                .try_get(target)
                .and_then(|d| d.single(feature))
                .cloned()
                .unwrap_or(Value::Null);
            if previous == source_value {
                return;
            }
            if let Some(displaced) = previous.as_object() {
                if let Some(back) = self.opposite(feature) {
                    self.clear_reference(displaced, back, target, pending);
                    if self.is_containment(back) {
                        self.release_child(target, displaced, back);
                    }
                }
                if self.is_containment(feature) {
                    self.release_child(displaced, target, feature);
                }
            }
            let Some(data) = self.heap.try_get_mut(target) else {
                return;
            };
            data.store(feature, source_value.clone());
            pending.push(Notification::new(
                target,
                feature,
                NotificationKind::Set,
                previous,
                source_value,
            ));
        }

        if let Some(data) = self.heap.try_get_mut(target) {
            if data.ready {
                data.explicitly_set.insert(feature);
            }
        }
        if self.is_containment(feature) {
            self.adopt_child(target, feature, source, pending);
        }
    }

    /// Remove `source` from `target.feature` without re-propagating to `source`
    pub(crate) fn unlink(
        &mut self,
        target: ObjectId,
        feature: ObjectId,
        source: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        self.clear_reference(target, feature, source, pending);
        if self.is_containment(feature) {
            self.release_child(source, target, feature);
        }
    }

    /// Remove one occurrence of `value` from `obj.feature`, or null it if scalar
    fn clear_reference(
        &mut self,
        obj: ObjectId,
        feature: ObjectId,
        value: ObjectId,
        pending: &mut Vec<Notification>,
    ) {
        let many = self.is_many(feature);
        let value = Value::Object(value);
        let Some(data) = self.heap.try_get_mut(obj) else {
            return;
        };
        if many {
            let removed = data
                .collection_mut(feature)
                .and_then(|c| c.remove_value(&value));
            if let Some(position) = removed {
                pending.push(
                    Notification::new(obj, feature, NotificationKind::Remove, value, Value::Null)
                        .at(position),
                );
            }
        } else if data.single(feature) == Some(&value) {
            data.store(feature, Value::Null);
            pending.push(Notification::new(
                obj,
                feature,
                NotificationKind::Unset,
                value,
                Value::Null,
            ));
        }
    }

    /// Materialize the collection slot of a multi-valued feature
    ///
    /// A scalar slot left over from before the feature became multi-valued
    /// is converted, keeping its value.
    pub(crate) fn ensure_collection(&mut self, obj: ObjectId, feature: ObjectId) {
        let kind = self.collection_kind(feature);
        let Some(data) = self.heap.try_get_mut(obj) else {
            return;
        };
        let leftover = match data.slots.get(&feature) {
            Some(Slot::Many(_)) => return,
            Some(Slot::Single(value)) => Some(value.clone()),
            None => None,
        };
        let items = leftover.filter(|v| !v.is_null());
        data.slots
            .insert(feature, Slot::Many(Collection::from_items(kind, items)));
    }

    /// Finish a mutation: run hierarchy hooks and deliver notifications
    pub(crate) fn commit(&mut self, owner: ObjectId, feature: ObjectId, pending: Vec<Notification>) -> MopResult<()> {
        self.after_mutation(owner, feature);
        self.dispatch(pending);
        Ok(())
    }
}

/// Merge single-element additions per `(notifier, feature)` into batch events
pub(crate) fn coalesce_adds(pending: Vec<Notification>) -> Vec<Notification> {
    let mut out: Vec<Notification> = Vec::with_capacity(pending.len());
    let mut groups: FxHashMap<(ObjectId, ObjectId), usize> = FxHashMap::default();
    for notification in pending {
        if notification.kind == NotificationKind::Add {
            let key = (notification.notifier, notification.feature);
            if let Some(&index) = groups.get(&key) {
                let merged = &mut out[index];
                merged.kind = NotificationKind::AddMany;
                match &mut merged.new {
                    Value::List(items) => items.push(notification.new),
                    first => {
                        let first = std::mem::take(first);
                        merged.new = Value::List(vec![first, notification.new]);
                    }
                }
                continue;
            }
            groups.insert(key, out.len());
        }
        out.push(notification);
    }
    out
}
