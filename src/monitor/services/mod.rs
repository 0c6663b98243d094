//! Application services for reconciliation.

mod reconcile;
mod settings;

pub use reconcile::{CycleReport, MonitorError, ReconciliationLoop};
pub use settings::MonitorSettings;
