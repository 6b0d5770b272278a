//! Rate-limited batch driver.
//!
//! One remote call per work item, fanned out in windows of at most W calls.
//! Each window is joined together with a pacing sleep, so a window takes at
//! least one rate-limit period and the next window never opens before every
//! call in the current one has resolved.

use std::future::Future;

use futures::future::join_all;
use tokio::time::{Duration, sleep};
use tracing::{info, instrument, warn};

use crate::budget::ContinuationBudget;
use crate::error::{BoxError, EngineError};
use crate::source::FleetIndexSource;
use crate::types::{ExcludeSet, ItemFailure, WindowReport};

/// Window sizing and pacing for one job's remote-call type.
#[derive(Debug, Clone)]
pub struct WindowConfig {
  /// Provider rate ceiling: maximum concurrent calls per window.
  pub size: usize,
  /// Minimum duration of one window (the rate-limit period).
  pub pacing: Duration,
}

/// Result of driving an ordered list.
#[derive(Debug)]
pub enum ListOutcome {
  /// The list was exhausted.
  Complete {
    processed: u64,
    windows: u32,
    report: WindowReport,
  },
  /// The budget ran out with entries left. `next_index` is the first list
  /// index not covered by a joined window; every call before it has
  /// resolved, so the checkpoint never points past unconfirmed work.
  BudgetExhausted {
    next_index: usize,
    processed: u64,
    windows: u32,
    report: WindowReport,
  },
}

/// Fans out one call per id, joined together with the pacing sleep.
///
/// A failing call never fails the window: it is logged and aggregated into
/// the returned [WindowReport].
#[instrument(level = "trace", skip(ids, call))]
pub async fn drive_window<F, Fut>(ids: &[String], pacing: Duration, call: F) -> WindowReport
where
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<(), BoxError>>,
{
  let calls = ids.iter().map(|id| {
    let fut = call(id.clone());
    async move { (id.clone(), fut.await) }
  });
  let (results, _) = tokio::join!(join_all(calls), sleep(pacing));

  let mut report = WindowReport::default();
  for (device_id, result) in results {
    report.attempted += 1;
    match result {
      Ok(()) => report.succeeded += 1,
      Err(e) => {
        warn!(device_id = %device_id, error = %e, "device call failed");
        report.failures.push(ItemFailure {
          device_id,
          error: e.to_string(),
        });
      }
    }
  }
  report
}

/// Drives `items[start_index..]` through windows of `window.size` non-empty
/// ids, checking the budget at every window boundary.
///
/// Empty entries are skipped without consuming a rate-limit slot. The
/// cumulative processed count (including `already_processed` from prior
/// invocations) is logged after every window.
#[instrument(level = "trace", skip(items, call))]
pub async fn drive_list<F, Fut>(
  items: &[String],
  start_index: usize,
  already_processed: u64,
  window: &WindowConfig,
  budget: &ContinuationBudget,
  call: F,
) -> ListOutcome
where
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<(), BoxError>>,
{
  let mut report = WindowReport::default();
  let mut processed = already_processed;
  let mut windows_done: u32 = 0;

  let mut batch: Vec<String> = Vec::with_capacity(window.size);
  let mut i = start_index;
  while i < items.len() {
    if !items[i].is_empty() {
      batch.push(items[i].clone());
    }
    i += 1;

    let at_window_boundary = batch.len() == window.size;
    let at_end = i == items.len();
    if (at_window_boundary || at_end) && !batch.is_empty() {
      let window_report = drive_window(&batch, window.pacing, &call).await;
      processed += window_report.attempted;
      report.merge(window_report);
      windows_done += 1;
      batch.clear();
      info!(processed, windows_done, "window complete");

      if !at_end && budget.exhausted(windows_done) {
        return ListOutcome::BudgetExhausted {
          next_index: i,
          processed,
          windows: windows_done,
          report,
        };
      }
    }
  }

  ListOutcome::Complete {
    processed,
    windows: windows_done,
    report,
  }
}

/// Resume position and cumulative counters for [drive_pages].
pub struct PageDrive<'a> {
  pub source: &'a FleetIndexSource,
  /// Cursor from the prior invocation's checkpoint, `None` for a fresh job.
  pub start_token: Option<String>,
  /// Pages consumed across prior invocations.
  pub pages_done: u32,
  /// Devices processed across prior invocations.
  pub processed: u64,
  pub pacing: Duration,
  /// Ids filtered client-side, on top of the query-layer exclusion clause.
  pub exclude: &'a ExcludeSet,
}

/// Result of driving a cursor-based source.
#[derive(Debug)]
pub enum PageOutcome {
  /// The query returned no further token.
  Complete {
    processed: u64,
    pages_done: u32,
    report: WindowReport,
  },
  /// The page budget ran out with a token still pending. The token was
  /// returned by a fully joined page, so it never points past unconfirmed
  /// work.
  BudgetExhausted {
    next_token: String,
    pages_done: u32,
    processed: u64,
    report: WindowReport,
  },
}

/// Drives a cursor-based source one page at a time.
///
/// Page size equals the window size for the jobs that use this path, so each
/// page is dispatched as a single window and the budget is checked once per
/// page. Excluded and empty ids are dropped before dispatch and never consume
/// a rate-limit slot.
#[instrument(level = "trace", skip(drive, budget, call))]
pub async fn drive_pages<F, Fut>(
  drive: PageDrive<'_>,
  budget: &ContinuationBudget,
  call: F,
) -> Result<PageOutcome, EngineError>
where
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<(), BoxError>>,
{
  let mut report = WindowReport::default();
  let mut processed = drive.processed;
  let mut pages_done = drive.pages_done;
  let mut pages_this_invocation: u32 = 0;
  let mut token = drive.start_token;

  loop {
    let page = drive.source.next_page(token.as_deref()).await?;
    let ids: Vec<String> = page
      .device_ids
      .into_iter()
      .filter(|id| !id.is_empty() && !drive.exclude.contains(id))
      .collect();

    let window_report = drive_window(&ids, drive.pacing, &call).await;
    processed += window_report.attempted;
    report.merge(window_report);
    pages_done += 1;
    pages_this_invocation += 1;
    info!(processed, pages_done, "page complete");

    match page.next_token {
      None => {
        return Ok(PageOutcome::Complete {
          processed,
          pages_done,
          report,
        });
      }
      Some(next_token) => {
        if budget.exhausted(pages_this_invocation) {
          return Ok(PageOutcome::BudgetExhausted {
            next_token,
            pages_done,
            processed,
            report,
          });
        }
        token = Some(next_token);
      }
    }
  }
}
