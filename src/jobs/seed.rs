//! Seed/delete job: create or remove demo devices in bulk, for exercising
//! the tagging and group-fill jobs at scale.

use tracing::{error, info, instrument};

use crate::budget::ContinuationBudget;
use crate::driver::{ListOutcome, PageDrive, PageOutcome, WindowConfig, drive_list, drive_pages};
use crate::error::EngineError;
use crate::source::FleetIndexSource;
use crate::types::{CursorResume, ExcludeSet, JobInvocation, ListResume, SeedInvocation, SeedMode};

use super::{Deps, RunOutcome};

/// Runs one invocation of the seed/delete job.
#[instrument(level = "trace", skip(payload, deps))]
pub async fn run(payload: SeedInvocation, deps: &Deps) -> Result<RunOutcome, EngineError> {
  let prefix = payload
    .prefix
    .clone()
    .unwrap_or_else(|| deps.config.demo_prefix.clone());
  match payload.mode {
    SeedMode::Seed { count } => {
      let count = count.unwrap_or(deps.config.default_seed_count);
      seed_devices(payload, prefix, count, deps).await
    }
    SeedMode::Delete => delete_devices(payload, prefix, deps).await,
  }
}

/// Creates `<prefix>0 .. <prefix>{count-1}`, resumable by index.
async fn seed_devices(
  payload: SeedInvocation,
  prefix: String,
  count: u64,
  deps: &Deps,
) -> Result<RunOutcome, EngineError> {
  let cfg = &deps.config;
  let names: Vec<String> = (0..count).map(|i| format!("{prefix}{i}")).collect();
  let (start_index, already_processed) = payload
    .list_resume
    .as_ref()
    .map(|r| (r.next_index, r.processed))
    .unwrap_or((0, 0));
  let window = WindowConfig {
    size: cfg.create_per_second,
    pacing: cfg.pacing(),
  };
  let budget = ContinuationBudget::wall_clock(cfg.continuation_margin());

  info!(prefix = %prefix, count, start_index, "seeding devices");
  let outcome = drive_list(
    &names,
    start_index,
    already_processed,
    &window,
    &budget,
    |id| {
      let fleet = deps.fleet.clone();
      async move { fleet.create_device(&id).await }
    },
  )
  .await;

  match outcome {
    ListOutcome::Complete {
      processed, report, ..
    } => {
      info!(processed, failed = report.failed(), "seeding complete");
      Ok(RunOutcome::Complete { processed })
    }
    ListOutcome::BudgetExhausted {
      next_index,
      processed,
      ..
    } => {
      let continuation = JobInvocation::Seed(SeedInvocation {
        mode: SeedMode::Seed { count: Some(count) },
        prefix: Some(prefix),
        list_resume: Some(ListResume {
          next_index,
          processed,
        }),
        cursor_resume: None,
      });
      if let Err(e) = deps.sink.dispatch(continuation.clone()).await {
        error!(error = %e, checkpoint = ?continuation, "continuation dispatch failed");
        return Err(EngineError::ContinuationDispatch(e));
      }
      info!(next_index, processed, "continuation dispatched");
      Ok(RunOutcome::Continued)
    }
  }
}

/// Deletes every device matching `<prefix>*`, one index page per window,
/// resumable by cursor.
async fn delete_devices(
  payload: SeedInvocation,
  prefix: String,
  deps: &Deps,
) -> Result<RunOutcome, EngineError> {
  let cfg = &deps.config;
  let source = FleetIndexSource::new(
    deps.fleet.clone(),
    format!("{prefix}*"),
    None,
    cfg.delete_per_second,
  );
  let budget = ContinuationBudget::pages(cfg.max_search_pages);
  let (start_token, pages_done, processed) = payload
    .cursor_resume
    .map(|r| (Some(r.next_token), r.pages_done, r.processed))
    .unwrap_or((None, 0, 0));
  let exclude = ExcludeSet::default();

  info!(prefix = %prefix, "deleting devices");
  let outcome = drive_pages(
    PageDrive {
      source: &source,
      start_token,
      pages_done,
      processed,
      pacing: cfg.pacing(),
      exclude: &exclude,
    },
    &budget,
    |id| {
      let fleet = deps.fleet.clone();
      async move { fleet.delete_device(&id).await }
    },
  )
  .await?;

  match outcome {
    PageOutcome::Complete {
      processed, report, ..
    } => {
      info!(processed, failed = report.failed(), "deletion complete");
      Ok(RunOutcome::Complete { processed })
    }
    PageOutcome::BudgetExhausted {
      next_token,
      pages_done,
      processed,
      ..
    } => {
      let continuation = JobInvocation::Seed(SeedInvocation {
        mode: SeedMode::Delete,
        prefix: Some(prefix),
        list_resume: None,
        cursor_resume: Some(CursorResume {
          next_token,
          pages_done,
          processed,
        }),
      });
      if let Err(e) = deps.sink.dispatch(continuation.clone()).await {
        error!(error = %e, checkpoint = ?continuation, "continuation dispatch failed");
        return Err(EngineError::ContinuationDispatch(e));
      }
      info!(pages_done, processed, "continuation dispatched");
      Ok(RunOutcome::Continued)
    }
  }
}
