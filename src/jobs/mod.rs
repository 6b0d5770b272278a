//! The three jobs built on the engine, plus the invocation dispatcher.

use std::sync::Arc;

use tracing::instrument;

use crate::blob::BlobStore;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fleet::FleetClient;
use crate::sink::ContinuationSink;
use crate::types::JobInvocation;

pub mod group_fill;
pub mod seed;
pub mod tag;
#[cfg(test)]
pub(crate) mod test_support;

/// External collaborators and configuration for one invocation.
#[derive(Clone)]
pub struct Deps {
  pub fleet: Arc<dyn FleetClient>,
  pub blobs: Arc<dyn BlobStore>,
  pub sink: Arc<dyn ContinuationSink>,
  pub config: EngineConfig,
}

/// How one invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// The work source was exhausted; no continuation was dispatched.
  /// `processed` is cumulative across all invocations of the job.
  Complete { processed: u64 },
  /// The budget ran out; exactly one continuation was dispatched and this
  /// invocation did no further work.
  Continued,
}

/// Runs one invocation of whichever job the payload names.
#[instrument(level = "trace", skip(invocation, deps))]
pub async fn run_invocation(
  invocation: JobInvocation,
  deps: &Deps,
) -> Result<RunOutcome, EngineError> {
  match invocation {
    JobInvocation::Tag(payload) => tag::run(payload, deps).await,
    JobInvocation::GroupFill(payload) => group_fill::run(payload, deps).await,
    JobInvocation::Seed(payload) => seed::run(payload, deps).await,
  }
}

/// Drives a job and every continuation it dispatches to completion, draining
/// the [crate::sink::ChannelSink] queue `rx`.
///
/// In-process stand-in for the platform's self-invocation transport; the
/// production deployment wires [ContinuationSink] to a real trigger instead.
/// Returns the outcome of the last invocation run.
pub async fn run_until_complete(
  first: JobInvocation,
  deps: &Deps,
  rx: &mut tokio::sync::mpsc::UnboundedReceiver<JobInvocation>,
) -> Result<RunOutcome, EngineError> {
  let mut outcome = run_invocation(first, deps).await?;
  while let Ok(next) = rx.try_recv() {
    outcome = run_invocation(next, deps).await?;
  }
  Ok(outcome)
}
