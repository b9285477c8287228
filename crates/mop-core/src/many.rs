//! Multi-valued feature operations
//!
//! Collections are addressed by [`CollectionRef`] and mutated only through
//! the runtime, which type-checks every element, keeps containment and
//! opposites consistent and notifies the owner's observers.

use crate::notify::{Notification, NotificationKind};
use crate::options::BoundsPolicy;
use crate::propagate::coalesce_adds;
use crate::reflect::FeatureRef;
use crate::value::{CollectionRef, ObjectId, Value};
use crate::{MopError, MopResult, Runtime};

impl Runtime {
    /// Check that `coll` names a multi-valued feature of its live owner
    fn check_collection(&self, coll: CollectionRef) -> MopResult<()> {
        let class = self.class_of(coll.owner)?;
        if self.has_feature(class, coll.feature) && self.is_many(coll.feature) {
            return Ok(());
        }
        Err(MopError::UnknownFeature {
            class: self.display_name(class),
            feature: self.display_name(coll.feature),
        })
    }

    fn check_upper_bound(&self, feature: ObjectId, new_len: usize) -> MopResult<()> {
        if self.options.bounds != BoundsPolicy::Enforce {
            return Ok(());
        }
        let upper = self.upper_bound(feature);
        if upper >= 0 && new_len as i64 > upper {
            return Err(MopError::UpperBoundExceeded {
                feature: self.display_name(feature),
                upper,
            });
        }
        Ok(())
    }

    /// Elements of a collection (empty if never materialized)
    pub fn collection_items(&self, coll: CollectionRef) -> MopResult<&[Value]> {
        self.check_collection(coll)?;
        Ok(self.raw_items(coll.owner, coll.feature))
    }

    /// Number of elements in a collection
    pub fn collection_len(&self, coll: CollectionRef) -> MopResult<usize> {
        Ok(self.collection_items(coll)?.len())
    }

    /// Mutable view over a multi-valued feature
    pub fn many<'a>(&mut self, obj: ObjectId, feature: impl Into<FeatureRef<'a>>) -> MopResult<ManyMut<'_>> {
        let feature = feature.into();
        match self.get(obj, feature)? {
            Value::Collection(coll) => Ok(ManyMut { rt: self, coll }),
            _ => Err(MopError::UnsupportedCollectionOperation {
                feature: feature.to_string(),
                operation: "many",
            }),
        }
    }

    /// Add one element
    ///
    /// Returns `Ok(false)` without side effects when a unique collection
    /// already holds the value.
    pub fn add(&mut self, coll: CollectionRef, value: impl Into<Value>) -> MopResult<bool> {
        let value = value.into();
        self.check_collection(coll)?;
        let CollectionRef { owner, feature } = coll;
        self.check_value(owner, feature, &value)?;
        self.ensure_collection(owner, feature);

        let (len, present) = match self.heap.get(owner)?.collection(feature) {
            Some(c) if c.kind().is_unique() && c.contains(&value) => return Ok(false),
            Some(c) => (c.len(), c.contains(&value)),
            None => (0, false),
        };
        self.check_upper_bound(feature, len + 1)?;

        let ready = self.heap.get(owner)?.ready;
        let mut pending = Vec::new();
        // a repeated list element is already linked
        if ready && !present && self.is_reference(feature) {
            if let Some(target) = value.as_object() {
                self.attach(owner, feature, target, &mut pending);
            }
        }

        let data = self.heap.get_mut(owner)?;
        let Some(collection) = data.collection_mut(feature) else {
            return Ok(false);
        };
        if !collection.push(value.clone()) {
            return Ok(false);
        }
        let position = collection.len() - 1;
        if ready {
            data.explicitly_set.insert(feature);
        }
        pending.push(
            Notification::new(owner, feature, NotificationKind::Add, Value::Null, value).at(position),
        );
        self.commit(owner, feature, pending)?;
        Ok(true)
    }

    /// Add several elements with a single notification to the owner
    ///
    /// Every element is type-checked before any is stored. Elements already
    /// present in a unique collection are skipped. Opposite-side additions
    /// are merged into one notification per affected instance. Returns the
    /// number of elements added.
    pub fn add_all<I>(&mut self, coll: CollectionRef, values: I) -> MopResult<usize>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.check_collection(coll)?;
        let CollectionRef { owner, feature } = coll;
        for value in &values {
            self.check_value(owner, feature, value)?;
        }
        self.ensure_collection(owner, feature);

        let (accepted, linked, start) = {
            let Some(collection) = self.heap.get(owner)?.collection(feature) else {
                return Ok(0);
            };
            let unique = collection.kind().is_unique();
            let mut accepted: Vec<Value> = Vec::with_capacity(values.len());
            let mut linked: Vec<ObjectId> = Vec::new();
            for value in values {
                let repeated = collection.contains(&value) || accepted.contains(&value);
                if unique && repeated {
                    continue;
                }
                if let (false, Some(target)) = (repeated, value.as_object()) {
                    linked.push(target);
                }
                accepted.push(value);
            }
            (accepted, linked, collection.len())
        };
        if accepted.is_empty() {
            return Ok(0);
        }
        self.check_upper_bound(feature, start + accepted.len())?;

        let ready = self.heap.get(owner)?.ready;
        let mut pending = Vec::new();
        if ready && self.is_reference(feature) {
            for target in &linked {
                self.attach(owner, feature, *target, &mut pending);
            }
        }

        let data = self.heap.get_mut(owner)?;
        if let Some(collection) = data.collection_mut(feature) {
            for value in &accepted {
                collection.push(value.clone());
            }
        }
        if ready {
            data.explicitly_set.insert(feature);
        }

        let count = accepted.len();
        let mut pending = coalesce_adds(pending);
        pending.push(
            Notification::new(
                owner,
                feature,
                NotificationKind::AddMany,
                Value::Null,
                Value::List(accepted),
            )
            .at(start),
        );
        self.commit(owner, feature, pending)?;
        Ok(count)
    }

    /// Remove the first occurrence of an element; `Ok(false)` if absent
    pub fn remove(&mut self, coll: CollectionRef, value: &Value) -> MopResult<bool> {
        self.check_collection(coll)?;
        let CollectionRef { owner, feature } = coll;
        let (position, occurrences) = match self.heap.get(owner)?.collection(feature) {
            Some(c) => match c.position(value) {
                Some(position) => (position, c.occurrences(value)),
                None => return Ok(false),
            },
            None => return Ok(false),
        };

        let ready = self.heap.get(owner)?.ready;
        let mut pending = Vec::new();
        if ready && self.is_reference(feature) {
            if let Some(target) = value.as_object() {
                self.detach(owner, feature, target, occurrences == 1, &mut pending);
            }
        }

        let data = self.heap.get_mut(owner)?;
        if let Some(collection) = data.collection_mut(feature) {
            collection.remove_value(value);
        }
        if ready {
            data.explicitly_set.insert(feature);
        }
        pending.push(
            Notification::new(owner, feature, NotificationKind::Remove, value.clone(), Value::Null)
                .at(position),
        );
        self.commit(owner, feature, pending)?;
        Ok(true)
    }

    /// Replace the element at `index`, returning the previous element
    ///
    /// Only duplicate-allowing (list) collections support positional
    /// replacement. The owner receives a `Set` notification carrying the
    /// position.
    pub fn replace_at(&mut self, coll: CollectionRef, index: usize, value: impl Into<Value>) -> MopResult<Value> {
        let value = value.into();
        self.check_collection(coll)?;
        let CollectionRef { owner, feature } = coll;
        self.ensure_collection(owner, feature);

        let (old, occurrences, present) = {
            let Some(collection) = self.heap.get(owner)?.collection(feature) else {
                return Err(MopError::IndexOutOfBounds { index, len: 0 });
            };
            if !collection.kind().supports_replace() {
                return Err(MopError::UnsupportedCollectionOperation {
                    feature: self.display_name(feature),
                    operation: "replace_at",
                });
            }
            let Some(old) = collection.get(index).cloned() else {
                return Err(MopError::IndexOutOfBounds {
                    index,
                    len: collection.len(),
                });
            };
            let occurrences = collection.occurrences(&old);
            (old, occurrences, collection.contains(&value))
        };
        self.check_value(owner, feature, &value)?;
        if old == value {
            return Ok(old);
        }

        let ready = self.heap.get(owner)?.ready;
        let mut pending = Vec::new();
        if ready && self.is_reference(feature) {
            if let Some(previous) = old.as_object() {
                self.detach(owner, feature, previous, occurrences == 1, &mut pending);
            }
            if let (false, Some(target)) = (present, value.as_object()) {
                self.attach(owner, feature, target, &mut pending);
            }
        }

        let data = self.heap.get_mut(owner)?;
        if let Some(collection) = data.collection_mut(feature) {
            collection.replace(index, value.clone());
        }
        if ready {
            data.explicitly_set.insert(feature);
        }
        pending.push(
            Notification::new(owner, feature, NotificationKind::Set, old.clone(), value).at(index),
        );
        self.commit(owner, feature, pending)?;
        Ok(old)
    }

    /// Remove every element, last to first; returns how many were removed
    pub fn clear(&mut self, coll: CollectionRef) -> MopResult<usize> {
        let items = self.collection_items(coll)?.to_vec();
        let mut removed = 0;
        for value in items.iter().rev() {
            if self.remove(coll, value)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Mutable view over one instance's multi-valued feature
pub struct ManyMut<'a> {
    rt: &'a mut Runtime,
    coll: CollectionRef,
}

impl<'a> ManyMut<'a> {
    /// Collection identity
    pub fn collection_ref(&self) -> CollectionRef {
        self.coll
    }

    /// Elements in order
    pub fn items(&self) -> &[Value] {
        self.rt.raw_items(self.coll.owner, self.coll.feature)
    }

    /// Object elements in order
    pub fn objects(&self) -> Vec<ObjectId> {
        self.items().iter().filter_map(Value::as_object).collect()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Membership test
    pub fn contains(&self, value: &Value) -> bool {
        self.items().contains(value)
    }

    /// Element at a position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items().get(index)
    }

    /// See [`Runtime::add`]
    pub fn add(&mut self, value: impl Into<Value>) -> MopResult<bool> {
        self.rt.add(self.coll, value)
    }

    /// See [`Runtime::add_all`]
    pub fn add_all<I>(&mut self, values: I) -> MopResult<usize>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.rt.add_all(self.coll, values)
    }

    /// See [`Runtime::remove`]
    pub fn remove(&mut self, value: impl Into<Value>) -> MopResult<bool> {
        self.rt.remove(self.coll, &value.into())
    }

    /// See [`Runtime::replace_at`]
    pub fn replace_at(&mut self, index: usize, value: impl Into<Value>) -> MopResult<Value> {
        self.rt.replace_at(self.coll, index, value)
    }

    /// See [`Runtime::clear`]
    pub fn clear(&mut self) -> MopResult<usize> {
        self.rt.clear(self.coll)
    }
}
