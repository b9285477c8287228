//! Runtime configuration

use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_INITIAL_CAPACITY;

/// How declared cardinality bounds are treated at mutation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Bounds are stored but never checked
    #[default]
    Ignore,
    /// Collection growth past a non-negative `upperBound` is rejected
    Enforce,
}

/// What `set` does with a name that resolves to no feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdHocPolicy {
    /// Store the value in the instance's untyped side table
    #[default]
    Allow,
    /// Fail with `UnknownFeature`
    Reject,
}

/// Runtime options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Cardinality enforcement
    pub bounds: BoundsPolicy,

    /// Handling of assignments outside the reflective schema
    pub ad_hoc: AdHocPolicy,

    /// Arena slots reserved at startup
    pub initial_capacity: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            bounds: BoundsPolicy::default(),
            ad_hoc: AdHocPolicy::default(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl RuntimeOptions {
    /// Options with bound enforcement switched on
    pub fn enforcing_bounds() -> Self {
        Self {
            bounds: BoundsPolicy::Enforce,
            ..Self::default()
        }
    }

    /// Set the bounds policy
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the ad-hoc assignment policy
    pub fn with_ad_hoc(mut self, ad_hoc: AdHocPolicy) -> Self {
        self.ad_hoc = ad_hoc;
        self
    }

    /// Set the initial arena capacity
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RuntimeOptions::default();
        assert_eq!(opts.bounds, BoundsPolicy::Ignore);
        assert_eq!(opts.ad_hoc, AdHocPolicy::Allow);
        assert_eq!(opts.initial_capacity, DEFAULT_INITIAL_CAPACITY);
    }

    #[test]
    fn test_chaining() {
        let opts = RuntimeOptions::default()
            .with_bounds(BoundsPolicy::Enforce)
            .with_ad_hoc(AdHocPolicy::Reject)
            .with_initial_capacity(16);
        assert_eq!(opts.bounds, BoundsPolicy::Enforce);
        assert_eq!(opts.ad_hoc, AdHocPolicy::Reject);
        assert_eq!(opts.initial_capacity, 16);
        assert_eq!(RuntimeOptions::enforcing_bounds().bounds, BoundsPolicy::Enforce);
    }
}
