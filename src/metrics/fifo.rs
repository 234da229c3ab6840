//! FIFO Cache Metrics
//!
//! Metrics specific to the concurrent FIFO cache.

use super::{CacheMetrics, CoreCacheMetrics};
use std::collections::BTreeMap;

/// FIFO-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Clone, PartialEq)]
pub struct FifoCacheMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Trims skipped because another thread was already trimming. Counted
    /// whatever the queue size was at the time, so it measures contention on
    /// the trimmer rather than how often the bound was overshot.
    pub skipped_trims: u64,
}

impl FifoCacheMetrics {
    /// Converts FIFO metrics to a BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("skipped_trims".to_string(), self.skipped_trims as f64);
        metrics
    }
}

impl CacheMetrics for FifoCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "FIFO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_metrics_include_skipped_trims() {
        let metrics = FifoCacheMetrics {
            core: CoreCacheMetrics::default(),
            skipped_trims: 3,
        };
        assert_eq!(metrics.algorithm_name(), "FIFO");
        assert_eq!(metrics.metrics()["skipped_trims"], 3.0);
        assert!(metrics.metrics().contains_key("hit_rate"));
    }
}
