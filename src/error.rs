//! Engine error types.

use thiserror::Error;

/// Boxed error type carried across the collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal errors of one engine invocation.
///
/// Per-device call failures are not errors at this level; they are aggregated
/// into a [crate::types::WindowReport] and the invocation keeps going.
#[derive(Debug, Error)]
pub enum EngineError {
  /// A one-time provisioning step failed. Fresh starts only.
  #[error("provisioning failed: {0}")]
  Provision(#[source] BoxError),

  /// The work source (fleet index page or blob list) could not be read.
  #[error("reading the work source failed: {0}")]
  SourceRead(#[source] BoxError),

  /// A continuation payload could not be dispatched; the job is stalled at
  /// the last logged checkpoint.
  #[error("continuation dispatch failed: {0}")]
  ContinuationDispatch(#[source] BoxError),

  /// Configuration could not be loaded from the environment.
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}
