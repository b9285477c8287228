//! Object reclamation
//!
//! Mark-sweep over the object arena. Marking starts from the registry, the
//! meta level, pinned objects and caller-supplied roots, and follows every
//! stored reference: an object's class, its slot keys and values, and its
//! ad-hoc values. The container back-reference is weak and never traced.
//!
//! Swept slots bump their generation, so stale handles surface as
//! [`MopError::DanglingObject`](crate::MopError::DanglingObject).

use rustc_hash::FxHashSet;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::value::{ObjectId, Value};
use crate::Runtime;

/// Reclamation statistics
#[derive(Debug, Clone, Default)]
pub struct GcStats {
    /// Total number of collections
    pub collections: usize,

    /// Total objects freed
    pub objects_freed: usize,

    /// Total pause time across all collections
    pub total_pause_time: Duration,

    /// Last collection duration
    pub last_pause_time: Duration,

    /// Objects marked in last collection
    pub last_marked_count: usize,

    /// Objects freed in last collection
    pub last_freed_count: usize,

    /// Live objects after last collection
    pub live_objects: usize,
}

impl GcStats {
    fn update(&mut self, pause_time: Duration, marked: usize, freed: usize, live_objects: usize) {
        self.collections += 1;
        self.objects_freed += freed;
        self.total_pause_time += pause_time;
        self.last_pause_time = pause_time;
        self.last_marked_count = marked;
        self.last_freed_count = freed;
        self.live_objects = live_objects;
    }

    /// Average pause time
    pub fn avg_pause_time(&self) -> Duration {
        if self.collections == 0 {
            return Duration::ZERO;
        }
        self.total_pause_time / self.collections as u32
    }
}

impl Runtime {
    /// Keep an object alive across collections regardless of reachability
    pub fn pin(&mut self, obj: ObjectId) -> bool {
        self.heap.contains(obj) && self.pinned.insert(obj)
    }

    /// Undo [`Runtime::pin`]; returns false if the object was not pinned
    pub fn unpin(&mut self, obj: ObjectId) -> bool {
        self.pinned.remove(&obj)
    }

    /// Statistics accumulated over every collection so far
    pub fn gc_stats(&self) -> &GcStats {
        &self.gc_stats
    }

    /// Reclaim every object unreachable from the registry, the meta level,
    /// pinned objects and `roots`
    pub fn collect_garbage(&mut self, roots: &[ObjectId]) -> GcStats {
        let start = Instant::now();

        let marked = self.mark(roots);
        let freed = self.sweep(&marked);

        // containers are weak: a survivor may have lost its parent
        let live = &self.heap;
        let orphans: Vec<ObjectId> = live
            .iter()
            .filter(|(_, data)| data.container.is_some_and(|p| !live.contains(p)))
            .map(|(id, _)| id)
            .collect();
        for orphan in orphans {
            if let Some(data) = self.heap.try_get_mut(orphan) {
                data.container = None;
                data.containment_feature = None;
            }
        }

        if freed > 0 {
            let heap = &self.heap;
            self.bindings.retain(|id, _| heap.contains(*id));
            self.operations.retain(|id, _| heap.contains(*id));
            self.hooks.retain(|id, _| heap.contains(*id));
            self.pinned.retain(|id| heap.contains(*id));
            self.invalidate_hierarchy();
        }

        let pause = start.elapsed();
        let live_objects = self.heap.len();
        self.gc_stats.update(pause, marked.len(), freed, live_objects);
        debug!(
            marked = marked.len(),
            freed,
            live = live_objects,
            pause_us = pause.as_micros() as u64,
            "Collected garbage"
        );
        self.gc_stats.clone()
    }

    fn mark(&self, roots: &[ObjectId]) -> FxHashSet<ObjectId> {
        let mut marked = FxHashSet::default();
        let mut stack: Vec<ObjectId> = Vec::new();
        stack.push(self.meta.ecore_package);
        stack.extend(self.registry.roots());
        stack.extend(self.pinned.iter().copied());
        stack.extend(roots.iter().copied());

        while let Some(id) = stack.pop() {
            let Some(data) = self.heap.try_get(id) else {
                continue;
            };
            if !marked.insert(id) {
                continue;
            }
            stack.push(data.class);
            stack.extend(data.slots.keys().copied());
            data.for_each_value(|value| trace_value(value, &mut stack));
        }
        marked
    }

    fn sweep(&mut self, marked: &FxHashSet<ObjectId>) -> usize {
        let mut freed = 0;
        for id in self.heap.ids() {
            if !marked.contains(&id) && self.heap.free(id).is_some() {
                freed += 1;
            }
        }
        freed
    }
}

fn trace_value(value: &Value, stack: &mut Vec<ObjectId>) {
    match value {
        Value::Object(id) => stack.push(*id),
        Value::Collection(coll) => {
            stack.push(coll.owner);
            stack.push(coll.feature);
        }
        Value::List(items) => items.iter().for_each(|v| trace_value(v, stack)),
        _ => {}
    }
}
