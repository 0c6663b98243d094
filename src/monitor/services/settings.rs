//! Tunables for the reconciliation loop.

use crate::config::Config;
use std::time::Duration;

/// Loop cadence and stall thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Only branches under this prefix are considered.
    pub branch_prefix: String,
    /// Sleep between cycles.
    pub poll_interval: Duration,
    /// Sleep after a failed cycle.
    pub error_backoff: Duration,
    /// A head commit older than this many minutes counts as inactivity.
    pub stall_threshold_mins: i64,
    /// Minutes after linking before stall detection applies.
    pub stall_grace_mins: i64,
}

impl MonitorSettings {
    /// Derives settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            branch_prefix: config.repository.branch_prefix.clone(),
            poll_interval: config.poll_interval(),
            error_backoff: config.error_backoff(),
            stall_threshold_mins: i64::from(config.stall_threshold_mins),
            stall_grace_mins: i64::from(config.stall_grace_mins),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
