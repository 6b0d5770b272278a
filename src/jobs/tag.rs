//! Shadow-tagging job: provision a dynamic cohort, then tag every device
//! matching the fleet query so it joins the cohort without waiting for index
//! propagation.

use tracing::{error, info, instrument};

use crate::budget::ContinuationBudget;
use crate::driver::{PageDrive, PageOutcome, drive_pages};
use crate::error::EngineError;
use crate::provision;
use crate::source::FleetIndexSource;
use crate::types::{
  ExcludeSet, JobDescriptor, JobInvocation, TagJobInvocation, TagJobResume, TagMarker,
};

use super::{Deps, RunOutcome};

/// Reloads the exclude set from the blob store. Runs on every invocation
/// that carries an exclude list, because the set is never checkpointed.
async fn load_exclude_set(
  deps: &Deps,
  exclude_list: Option<&str>,
) -> Result<ExcludeSet, EngineError> {
  let Some(key) = exclude_list else {
    return Ok(ExcludeSet::default());
  };
  let text = deps
    .blobs
    .fetch(key)
    .await
    .map_err(EngineError::SourceRead)?;
  let list = crate::blob::split_device_list(&text, &deps.config.list_delimiter);
  Ok(ExcludeSet::from_list(&list))
}

/// Runs one invocation of the shadow-tagging job.
///
/// Fresh payloads provision first: fleet indexing, exclude group (with an
/// asynchronous group-fill dispatch), dynamic group, rollout job. Resume
/// payloads skip provisioning and pick up the cursor; the marker from the
/// first invocation is reused verbatim so the cohort never forks.
#[instrument(level = "trace", skip(payload, deps))]
pub async fn run(payload: TagJobInvocation, deps: &Deps) -> Result<RunOutcome, EngineError> {
  let cfg = &deps.config;
  let job_name = payload
    .job_name
    .unwrap_or_else(|| cfg.default_job_name.clone());
  let fleet_query = payload
    .fleet_query
    .unwrap_or_else(|| cfg.default_fleet_query.clone());

  let (descriptor, start_token, pages_done, processed) = match payload.resume {
    None => {
      let descriptor = JobDescriptor {
        job_name,
        fleet_query,
        exclude_list: payload.exclude_list,
        marker: TagMarker::new(&cfg.shadow_key),
      };
      provision::enable_fleet_indexing(deps.fleet.as_ref(), cfg.index_poll_interval()).await?;
      provision::create_exclude_group(deps.fleet.as_ref(), deps.sink.as_ref(), &descriptor).await?;
      let target = provision::create_dynamic_group(deps.fleet.as_ref(), &descriptor).await?;
      provision::create_rollout_job(
        deps.fleet.as_ref(),
        &descriptor,
        &target,
        cfg.rollout_per_minute,
      )
      .await?;
      (descriptor, None, 0, 0)
    }
    Some(resume) => {
      let descriptor = JobDescriptor {
        job_name,
        fleet_query,
        exclude_list: payload.exclude_list,
        marker: resume.marker,
      };
      (
        descriptor,
        Some(resume.next_token),
        resume.pages_done,
        resume.processed,
      )
    }
  };

  // Client-side filter on top of the query-layer exclusion clause: a freshly
  // created exclude group may not be reflected in the index yet.
  let exclude = load_exclude_set(deps, descriptor.exclude_list.as_deref()).await?;

  let source = FleetIndexSource::new(
    deps.fleet.clone(),
    descriptor.fleet_query.clone(),
    descriptor.exclude_group().as_deref(),
    cfg.search_page_size,
  );
  let budget = ContinuationBudget::pages(cfg.max_search_pages);

  info!(
    job = %descriptor.job_name,
    marker_key = %descriptor.marker.key,
    marker_value = descriptor.marker.value,
    "updating device shadows"
  );
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
      let marker = descriptor.marker.clone();
      async move { fleet.update_shadow(&id, &marker.key, marker.value).await }
    },
  )
  .await?;

  match outcome {
    PageOutcome::Complete {
      processed, report, ..
    } => {
      info!(
        job = %descriptor.job_name,
        processed,
        failed = report.failed(),
        "shadow tagging complete; rollout job is targeting all matching devices"
      );
      Ok(RunOutcome::Complete { processed })
    }
    PageOutcome::BudgetExhausted {
      next_token,
      pages_done,
      processed,
      ..
    } => {
      let continuation = JobInvocation::Tag(TagJobInvocation {
        job_name: Some(descriptor.job_name.clone()),
        fleet_query: Some(descriptor.fleet_query.clone()),
        exclude_list: descriptor.exclude_list.clone(),
        resume: Some(TagJobResume {
          marker: descriptor.marker.clone(),
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
