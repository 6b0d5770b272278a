//! One-time provisioning steps for a fresh tagging job.
//!
//! Every step here is idempotent on the provider side and runs only when the
//! invocation payload carries no resume block. Failures are fatal to the job
//! and are never retried.

use serde_json::json;
use tokio::time::{Duration, sleep};
use tracing::{info, instrument};

use crate::error::{BoxError, EngineError};
use crate::fleet::{FleetClient, IndexStatus, IndexingMode, RolloutJobRequest};
use crate::sink::ContinuationSink;
use crate::source::with_exclusion;
use crate::types::{GroupFillInvocation, JobDescriptor, JobInvocation};

/// Ensures registry-and-shadow indexing is active, polling the index status
/// until the build completes. No-op when already enabled.
#[instrument(level = "trace", skip(fleet))]
pub async fn enable_fleet_indexing(
  fleet: &dyn FleetClient,
  poll_interval: Duration,
) -> Result<(), EngineError> {
  let mode = fleet.indexing_mode().await.map_err(EngineError::Provision)?;
  if mode == IndexingMode::RegistryAndShadow {
    info!("fleet indexing already enabled");
    return Ok(());
  }

  info!("activating fleet indexing");
  fleet
    .enable_registry_shadow_indexing()
    .await
    .map_err(EngineError::Provision)?;

  let mut polls: u32 = 0;
  loop {
    let status = fleet.index_status().await.map_err(EngineError::Provision)?;
    polls += 1;
    info!(
      ?status,
      elapsed_s = polls as u64 * poll_interval.as_secs(),
      "fleet index status"
    );
    if status == IndexStatus::Active {
      break;
    }
    sleep(poll_interval).await;
  }
  info!("fleet indexing active");
  Ok(())
}

/// Creates the static exclude group and dispatches a group-fill invocation to
/// populate it from the exclude list. Returns the group name, or `None` when
/// the job has no exclude list.
#[instrument(level = "trace", skip(fleet, sink))]
pub async fn create_exclude_group(
  fleet: &dyn FleetClient,
  sink: &dyn ContinuationSink,
  descriptor: &JobDescriptor,
) -> Result<Option<String>, EngineError> {
  let (Some(group_name), Some(list_ref)) =
    (descriptor.exclude_group(), descriptor.exclude_list.clone())
  else {
    return Ok(None);
  };

  info!(group = %group_name, "creating exclude group");
  let group_name = fleet
    .create_static_group(&group_name)
    .await
    .map_err(EngineError::Provision)?;

  sink
    .dispatch(JobInvocation::GroupFill(GroupFillInvocation {
      group_name: group_name.clone(),
      list_ref,
      resume: None,
    }))
    .await
    .map_err(|e: BoxError| EngineError::Provision(e))?;

  Ok(Some(group_name))
}

/// The dynamic-group membership query: devices already carrying the marker
/// or matching the fleet query, minus the exclude group when one exists.
pub fn build_group_query(descriptor: &JobDescriptor) -> String {
  let query = format!(
    "{} OR {}",
    descriptor.marker.index_term(),
    descriptor.fleet_query
  );
  with_exclusion(&query, descriptor.exclude_group().as_deref())
}

/// Creates the dynamic group for the job; returns its id/arn.
#[instrument(level = "trace", skip(fleet))]
pub async fn create_dynamic_group(
  fleet: &dyn FleetClient,
  descriptor: &JobDescriptor,
) -> Result<String, EngineError> {
  let query = build_group_query(descriptor);
  info!(group = %descriptor.job_name, query = %query, "creating dynamic group");
  fleet
    .create_dynamic_group(&descriptor.job_name, &query)
    .await
    .map_err(EngineError::Provision)
}

/// Creates the continuous rollout job targeting the dynamic group.
#[instrument(level = "trace", skip(fleet))]
pub async fn create_rollout_job(
  fleet: &dyn FleetClient,
  descriptor: &JobDescriptor,
  target: &str,
  max_per_minute: u32,
) -> Result<(), EngineError> {
  info!(job = %descriptor.job_name, target = %target, "creating rollout job");
  fleet
    .create_rollout_job(&RolloutJobRequest {
      job_id: descriptor.job_name.clone(),
      target: target.to_string(),
      document: json!({ "job": descriptor.job_name }),
      max_per_minute,
    })
    .await
    .map_err(EngineError::Provision)
}
