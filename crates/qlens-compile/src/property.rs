//! `PropertySet`: data shared between passes and returned to the caller.
//!
//! Passes record what they did here so the caller can report it, e.g. which
//! measurements were stripped before simulation.
//!
//! ```
//! use qlens_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct Marker(u32);
//!
//! let mut props = PropertySet::new();
//! props.insert(Marker(7));
//! assert_eq!(props.get::<Marker>(), Some(&Marker(7)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use qlens_ir::{ClbitId, QubitId};

/// Gate counts before and after a transpilation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranspileStats {
    pub ops_before: usize,
    pub ops_after: usize,
}

impl TranspileStats {
    pub fn removed(&self) -> usize {
        self.ops_before.saturating_sub(self.ops_after)
    }
}

/// Properties shared across passes.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Terminal measurements removed before simulation, in circuit order.
    pub final_measurements: Vec<(QubitId, ClbitId)>,

    /// Counts recorded by the pass manager.
    pub stats: TranspileStats,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a custom property, replacing any previous value of that type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(usize);

    #[test]
    fn test_custom_properties() {
        let mut props = PropertySet::new();
        assert!(props.get::<Counter>().is_none());

        props.insert(Counter(1));
        props.get_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(props.get::<Counter>(), Some(&Counter(2)));
        assert_eq!(props.remove::<Counter>(), Some(Counter(2)));
        assert!(props.get::<Counter>().is_none());
    }

    #[test]
    fn test_stats_removed() {
        let stats = TranspileStats {
            ops_before: 7,
            ops_after: 3,
        };
        assert_eq!(stats.removed(), 4);
        assert_eq!(TranspileStats::default().removed(), 0);
    }
}
