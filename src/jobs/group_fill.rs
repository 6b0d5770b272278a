//! Static group-fill job: add every device from a blob-stored list to a
//! static group, resumable by list index.

use tracing::{error, info, instrument};

use crate::blob::split_device_list;
use crate::budget::ContinuationBudget;
use crate::driver::{ListOutcome, WindowConfig, drive_list};
use crate::error::EngineError;
use crate::types::{GroupFillInvocation, JobInvocation, ListResume};

use super::{Deps, RunOutcome};

/// Runs one invocation of the group-fill job.
///
/// The list is reloaded on every invocation; only the resume index rides in
/// the continuation payload, which is valid as long as the blob is not
/// rewritten mid-job. The listed ids are the exclusion set itself, so there
/// is no client-side exclude filtering here.
#[instrument(level = "trace", skip(payload, deps), fields(group = %payload.group_name))]
pub async fn run(payload: GroupFillInvocation, deps: &Deps) -> Result<RunOutcome, EngineError> {
  let cfg = &deps.config;
  let text = deps
    .blobs
    .fetch(&payload.list_ref)
    .await
    .map_err(EngineError::SourceRead)?;
  let items = split_device_list(&text, &cfg.list_delimiter);

  let (start_index, already_processed) = payload
    .resume
    .as_ref()
    .map(|r| (r.next_index, r.processed))
    .unwrap_or((0, 0));
  let window = WindowConfig {
    size: cfg.group_add_per_second,
    pacing: cfg.pacing(),
  };
  let budget = ContinuationBudget::wall_clock(cfg.continuation_margin());

  info!(
    group = %payload.group_name,
    entries = items.len(),
    start_index,
    "adding devices to group"
  );
  let outcome = drive_list(
    &items,
    start_index,
    already_processed,
    &window,
    &budget,
    |id| {
      let fleet = deps.fleet.clone();
      let group = payload.group_name.clone();
      async move { fleet.add_to_group(&id, &group).await }
    },
  )
  .await;

  match outcome {
    ListOutcome::Complete {
      processed, report, ..
    } => {
      info!(
        group = %payload.group_name,
        processed,
        failed = report.failed(),
        "group fill complete"
      );
      Ok(RunOutcome::Complete { processed })
    }
    ListOutcome::BudgetExhausted {
      next_index,
      processed,
      ..
    } => {
      let continuation = JobInvocation::GroupFill(GroupFillInvocation {
        group_name: payload.group_name.clone(),
        list_ref: payload.list_ref.clone(),
        resume: Some(ListResume {
          next_index,
          processed,
        }),
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
