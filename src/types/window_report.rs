//! Per-window outcome aggregation.

use serde::Serialize;

/// One device call that failed inside a window.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
  pub device_id: String,
  pub error: String,
}

/// Outcome of one or more joined windows.
///
/// A failed device call never fails its window; it lands here instead, so
/// failure visibility is a return value rather than a log-only side effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WindowReport {
  /// Calls dispatched (non-empty ids only; skipped empties never count).
  pub attempted: u64,
  pub succeeded: u64,
  pub failures: Vec<ItemFailure>,
}

impl WindowReport {
  /// Folds another window's report into this one.
  pub fn merge(&mut self, other: WindowReport) {
    self.attempted += other.attempted;
    self.succeeded += other.succeeded;
    self.failures.extend(other.failures);
  }

  pub fn failed(&self) -> u64 {
    self.failures.len() as u64
  }
}
