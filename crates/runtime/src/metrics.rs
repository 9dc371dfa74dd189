use std::collections::BTreeMap;

/// Counter names shared by the map pipeline.
pub mod names {
    pub const REFRESH_COUNT: &str = "refresh.count";
    pub const REFRESH_ROLLED_BACK: &str = "refresh.rolled_back";
    pub const REFRESH_NOT_READY: &str = "refresh.not_ready";
    pub const TRACKS_REFRESHED: &str = "tracks.refreshed";
    pub const FIXES_SKIPPED: &str = "fixes.skipped";
    pub const FORECASTS_SKIPPED: &str = "forecasts.skipped";
    pub const FEATURES_INSTALLED: &str = "features.installed";
}

/// Deterministic metrics aggregation.
///
/// Sorted maps keep snapshots in a stable order so they can be compared in
/// tests and logged without churn.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: &'static str, by: u64) {
        *self.counters.entry(name).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    /// Last-write-wins value, e.g. the feature count of the latest refresh.
    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}
