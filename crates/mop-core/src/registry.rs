//! Classifier and package registry
//!
//! Maps classifier names and package namespace URIs to descriptors. The
//! registry only indexes; registered descriptors stay ordinary objects and
//! are kept alive by it during reclamation.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::value::ObjectId;
use crate::{MopError, MopResult, Runtime};

/// Name and namespace index over descriptors
#[derive(Debug, Default)]
pub struct ClassifierRegistry {
    /// Classifiers in registration order
    classifiers: Vec<ObjectId>,
    by_name: FxHashMap<String, ObjectId>,
    packages: FxHashMap<String, ObjectId>,
}

impl ClassifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered classifiers
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// Check if no classifier is registered
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Look up a classifier by name
    pub fn get_classifier(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    /// Look up a package by namespace URI
    pub fn get_package(&self, ns_uri: &str) -> Option<ObjectId> {
        self.packages.get(ns_uri).copied()
    }

    /// Check if a classifier is registered
    pub fn contains(&self, classifier: ObjectId) -> bool {
        self.by_name.values().any(|id| *id == classifier)
    }

    /// Classifiers in registration order
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.classifiers.iter().copied()
    }

    /// Registered packages
    pub fn packages(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.packages.values().copied()
    }

    /// Index a classifier under `name`
    ///
    /// Registering the same descriptor twice is a no-op; a different
    /// descriptor under a taken name is rejected.
    pub(crate) fn insert_classifier(&mut self, name: &str, classifier: ObjectId) -> MopResult<()> {
        match self.by_name.get(name) {
            Some(existing) if *existing == classifier => Ok(()),
            Some(_) => Err(MopError::DuplicateClassifier(name.to_string())),
            None => {
                self.by_name.insert(name.to_string(), classifier);
                self.classifiers.push(classifier);
                Ok(())
            }
        }
    }

    /// Index a package under `ns_uri`
    pub(crate) fn insert_package(&mut self, ns_uri: &str, package: ObjectId) -> MopResult<()> {
        match self.packages.get(ns_uri) {
            Some(existing) if *existing == package => Ok(()),
            Some(_) => Err(MopError::DuplicatePackage(ns_uri.to_string())),
            None => {
                self.packages.insert(ns_uri.to_string(), package);
                Ok(())
            }
        }
    }

    pub(crate) fn roots(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.classifiers.iter().chain(self.packages.values()).copied()
    }
}

impl Runtime {
    /// Register a classifier under its name
    pub fn register_classifier(&mut self, classifier: ObjectId) -> MopResult<()> {
        let name = self.registrable_name(classifier)?;
        self.registry.insert_classifier(&name, classifier)
    }

    fn registrable_name(&self, classifier: ObjectId) -> MopResult<String> {
        if !self.is_class(classifier) && !self.is_data_type(classifier) {
            return Err(MopError::TypeConformance {
                expected: "EClassifier".to_string(),
                found: self.describe(&classifier.into()),
            });
        }
        self.name(classifier)
            .map(str::to_string)
            .ok_or_else(|| MopError::TypeConformance {
                expected: "named EClassifier".to_string(),
                found: self.describe(&classifier.into()),
            })
    }

    /// Register a package under its namespace URI, with every contained
    /// classifier and subpackage
    ///
    /// A package without a namespace URI is registered under its name.
    /// Nothing is registered if any entry of the package tree is rejected.
    pub fn register_package(&mut self, package: ObjectId) -> MopResult<()> {
        let mut packages: Vec<(String, ObjectId)> = Vec::new();
        let mut classifiers: Vec<(String, ObjectId)> = Vec::new();
        let mut stack = vec![package];
        while let Some(current) = stack.pop() {
            if !self.is_package(current) {
                return Err(MopError::TypeConformance {
                    expected: "EPackage".to_string(),
                    found: self.describe(&current.into()),
                });
            }
            if packages.iter().any(|(_, p)| *p == current) {
                continue;
            }
            let key = match self.ns_uri(current) {
                Some(uri) => uri.to_string(),
                None => self.display_name(current),
            };
            let taken = self.registry.get_package(&key).into_iter();
            if taken
                .chain(packages.iter().filter(|(k, _)| *k == key).map(|(_, p)| *p))
                .any(|p| p != current)
            {
                return Err(MopError::DuplicatePackage(key));
            }
            for classifier in self.classifiers(current) {
                let name = self.registrable_name(classifier)?;
                let taken = self.registry.get_classifier(&name).into_iter();
                if taken
                    .chain(classifiers.iter().filter(|(n, _)| *n == name).map(|(_, c)| *c))
                    .any(|c| c != classifier)
                {
                    return Err(MopError::DuplicateClassifier(name));
                }
                classifiers.push((name, classifier));
            }
            packages.push((key, current));
            stack.extend(self.subpackages(current).into_iter().rev());
        }

        for (name, classifier) in &classifiers {
            self.registry.insert_classifier(name, *classifier)?;
        }
        for (key, pkg) in &packages {
            self.registry.insert_package(key, *pkg)?;
        }
        debug!(
            packages = packages.len(),
            classifiers = classifiers.len(),
            "Registered package"
        );
        Ok(())
    }

    /// Registered classifier by name
    pub fn classifier(&self, name: &str) -> Option<ObjectId> {
        self.registry.get_classifier(name)
    }

    /// Registered package by namespace URI
    pub fn package(&self, ns_uri: &str) -> Option<ObjectId> {
        self.registry.get_package(ns_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::ECORE_NS_URI;

    #[test]
    fn test_meta_level_is_registered() {
        let rt = Runtime::new();
        let m = *rt.meta();
        assert_eq!(rt.classifier("EClass"), Some(m.e_class));
        assert_eq!(rt.classifier("EString"), Some(m.e_string));
        assert_eq!(rt.package(ECORE_NS_URI), Some(m.ecore_package));
        assert!(rt.registry().contains(m.e_reference));
    }

    #[test]
    fn test_register_classifier_idempotent() {
        let mut rt = Runtime::new();
        let node = rt.create_class("Node").unwrap();
        let before = rt.registry().len();
        rt.register_classifier(node).unwrap();
        rt.register_classifier(node).unwrap();
        assert_eq!(rt.registry().len(), before + 1);
        assert_eq!(rt.classifier("Node"), Some(node));
    }

    #[test]
    fn test_duplicate_classifier_rejected() {
        let mut rt = Runtime::new();
        let a = rt.create_class("Node").unwrap();
        let b = rt.create_class("Node").unwrap();
        rt.register_classifier(a).unwrap();
        assert_eq!(
            rt.register_classifier(b).unwrap_err(),
            MopError::DuplicateClassifier("Node".to_string())
        );
    }

    #[test]
    fn test_register_package_recurses() {
        let mut rt = Runtime::new();
        let outer = rt.create_package("graph", "http://example.org/graph", "g").unwrap();
        let inner = rt.create_package("style", "http://example.org/graph/style", "gs").unwrap();
        rt.add_subpackage(outer, inner).unwrap();
        let node = rt.create_class("Node").unwrap();
        let color = rt.create_class("Color").unwrap();
        rt.add_classifier(outer, node).unwrap();
        rt.add_classifier(inner, color).unwrap();

        rt.register_package(outer).unwrap();
        assert_eq!(rt.package("http://example.org/graph"), Some(outer));
        assert_eq!(rt.package("http://example.org/graph/style"), Some(inner));
        assert_eq!(rt.classifier("Node"), Some(node));
        assert_eq!(rt.classifier("Color"), Some(color));
    }

    #[test]
    fn test_rejected_package_registers_nothing() {
        let mut rt = Runtime::new();
        let taken = rt.create_class("Node").unwrap();
        rt.register_classifier(taken).unwrap();

        let pkg = rt.create_package("graph", "http://example.org/graph", "g").unwrap();
        let edge = rt.create_class("Edge").unwrap();
        let node = rt.create_class("Node").unwrap();
        rt.add_classifier(pkg, edge).unwrap();
        rt.add_classifier(pkg, node).unwrap();

        let before = rt.registry().len();
        assert_eq!(
            rt.register_package(pkg).unwrap_err(),
            MopError::DuplicateClassifier("Node".to_string())
        );
        assert_eq!(rt.package("http://example.org/graph"), None);
        assert_eq!(rt.classifier("Edge"), None);
        assert_eq!(rt.registry().len(), before);
    }

    #[test]
    fn test_register_non_classifier() {
        let mut rt = Runtime::new();
        let name = rt.meta().named_element_name;
        assert!(matches!(
            rt.register_classifier(name),
            Err(MopError::TypeConformance { .. })
        ));
    }
}
