//! Time-boxed continuation budget.
//!
//! The budget is checked only at window/page boundaries, where a checkpoint
//! would be valid. Wall-clock budgets must be strictly below the platform's
//! hard execution ceiling so the continuation can be dispatched before the
//! platform kills the invocation.

use tokio::time::{Duration, Instant};

/// Budget for one invocation of a job.
#[derive(Debug, Clone)]
pub enum ContinuationBudget {
  /// Elapsed wall clock since the invocation began.
  WallClock { started: Instant, limit: Duration },
  /// Number of pages (or windows) consumed by this invocation.
  Pages { limit: u32 },
}

impl ContinuationBudget {
  /// Wall-clock budget starting now.
  pub fn wall_clock(limit: Duration) -> Self {
    Self::WallClock {
      started: Instant::now(),
      limit,
    }
  }

  /// Page-count budget. Page size equals one rate-limit window in the jobs
  /// that use this variant, so one page is one window.
  pub fn pages(limit: u32) -> Self {
    Self::Pages { limit }
  }

  /// True when no further window may start in this invocation.
  /// `pages_done` counts pages consumed by this invocation only.
  pub fn exhausted(&self, pages_done: u32) -> bool {
    match self {
      Self::WallClock { started, limit } => started.elapsed() > *limit,
      Self::Pages { limit } => pages_done >= *limit,
    }
  }
}
