//! Containment tree navigation

use rustc_hash::FxHashSet;

use crate::object::Slot;
use crate::value::ObjectId;
use crate::{MopResult, Runtime};

impl Runtime {
    /// Direct children through the containment features of `obj`'s class
    pub fn contents(&self, obj: ObjectId) -> MopResult<Vec<ObjectId>> {
        let data = self.heap.get(obj)?;
        let mut children = Vec::new();
        for feature in self.all_containments(data.class) {
            match data.slot(feature) {
                Some(Slot::Single(value)) => children.extend(value.as_object()),
                Some(Slot::Many(collection)) => {
                    children.extend(collection.iter().filter_map(|v| v.as_object()))
                }
                None => {}
            }
        }
        Ok(children)
    }

    /// Every transitive child in pre-order, `obj` excluded
    pub fn all_contents(&self, obj: ObjectId) -> MopResult<Vec<ObjectId>> {
        let mut out = Vec::new();
        let mut stack: Vec<ObjectId> = self.contents(obj)?.into_iter().rev().collect();
        let mut seen = FxHashSet::default();
        seen.insert(obj);
        while let Some(next) = stack.pop() {
            if !seen.insert(next) || !self.heap.contains(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.contents(next)?.into_iter().rev());
        }
        Ok(out)
    }

    /// Topmost container of `obj`, or `obj` itself when uncontained
    pub fn root(&self, obj: ObjectId) -> MopResult<ObjectId> {
        let mut current = obj;
        let mut seen = FxHashSet::default();
        while let Some(parent) = self.heap.get(current)?.container {
            if !seen.insert(current) || !self.heap.contains(parent) {
                break;
            }
            current = parent;
        }
        Ok(current)
    }

    /// Path of `obj` from its root
    ///
    /// `/` for a root, `<parent>/@feature.<index>` below a multi-valued
    /// containment and `<parent>/@feature` below a single-valued one.
    pub fn uri_fragment(&self, obj: ObjectId) -> MopResult<String> {
        let mut segments = Vec::new();
        let mut current = obj;
        let mut seen = FxHashSet::default();
        loop {
            let data = self.heap.get(current)?;
            let (Some(parent), Some(feature)) = (data.container, data.containment_feature) else {
                break;
            };
            if !seen.insert(current) || !self.heap.contains(parent) {
                break;
            }
            let name = self.display_name(feature);
            let segment = if self.is_many(feature) {
                let index = self
                    .heap
                    .get(parent)?
                    .collection(feature)
                    .and_then(|c| c.position(&current.into()))
                    .unwrap_or(0);
                format!("@{}.{}", name, index)
            } else {
                format!("@{}", name)
            };
            segments.push(segment);
            current = parent;
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FeatureDefinition;

    struct Tree {
        rt: Runtime,
        root: ObjectId,
        a: ObjectId,
        b: ObjectId,
        leaf: ObjectId,
    }

    fn tree() -> Tree {
        let mut rt = Runtime::new();
        let node = rt.create_class("Node").unwrap();
        rt.define_feature(node, FeatureDefinition::containment("children", node).many())
            .unwrap();
        rt.define_feature(node, FeatureDefinition::containment("detail", node))
            .unwrap();
        let root = rt.instantiate(node).unwrap();
        let a = rt.instantiate(node).unwrap();
        let b = rt.instantiate(node).unwrap();
        let leaf = rt.instantiate(node).unwrap();
        rt.many(root, "children").unwrap().add(a).unwrap();
        rt.many(root, "children").unwrap().add(b).unwrap();
        rt.set(a, "detail", leaf).unwrap();
        Tree { rt, root, a, b, leaf }
    }

    #[test]
    fn test_contents_and_all_contents() {
        let t = tree();
        assert_eq!(t.rt.contents(t.root).unwrap(), vec![t.a, t.b]);
        assert_eq!(t.rt.all_contents(t.root).unwrap(), vec![t.a, t.leaf, t.b]);
        assert!(t.rt.contents(t.leaf).unwrap().is_empty());
    }

    #[test]
    fn test_root() {
        let t = tree();
        assert_eq!(t.rt.root(t.leaf).unwrap(), t.root);
        assert_eq!(t.rt.root(t.root).unwrap(), t.root);
    }

    #[test]
    fn test_uri_fragment() {
        let t = tree();
        assert_eq!(t.rt.uri_fragment(t.root).unwrap(), "/");
        assert_eq!(t.rt.uri_fragment(t.b).unwrap(), "/@children.1");
        assert_eq!(t.rt.uri_fragment(t.leaf).unwrap(), "/@children.0/@detail");
    }

    #[test]
    fn test_meta_level_navigation() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.root(m.named_element_name).unwrap(), m.ecore_package);
        assert!(rt.contents(m.ecore_package).unwrap().contains(&m.e_class));
    }
}
