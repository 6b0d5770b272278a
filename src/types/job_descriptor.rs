//! Immutable description of one logical tagging job.

use serde::{Deserialize, Serialize};

use super::TagMarker;

/// Everything that identifies one shadow-tagging job.
///
/// Built exactly once, either from a fresh start payload plus configured
/// defaults, or reconstructed verbatim from a resume payload. Never mutated
/// after construction; continuations carry it in full so a reused process
/// can never leak one job's state into the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
  /// Rollout-job id; also names the dynamic group and prefixes the exclude
  /// group (`<job_name>-exclude`).
  pub job_name: String,
  /// Fleet-index predicate selecting target devices.
  pub fleet_query: String,
  /// Blob key of the delimited exclude list, when one is configured.
  pub exclude_list: Option<String>,
  /// Marker written onto every processed device.
  pub marker: TagMarker,
}

impl JobDescriptor {
  /// Name of the static exclude group for this job.
  pub fn exclude_group(&self) -> Option<String> {
    self
      .exclude_list
      .as_ref()
      .map(|_| format!("{}-exclude", self.job_name))
  }
}
