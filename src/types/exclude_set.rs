//! Device ids excluded from a job.

use std::collections::HashSet;

/// Set of device ids that must never receive a per-device call.
///
/// Loaded from the delimited exclude blob at the start of every invocation
/// that needs it; the set itself is never checkpointed.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
  ids: HashSet<String>,
}

impl ExcludeSet {
  /// Builds the set from an ordered id list, dropping empty entries.
  pub fn from_list(ids: &[String]) -> Self {
    Self {
      ids: ids.iter().filter(|id| !id.is_empty()).cloned().collect(),
    }
  }

  pub fn contains(&self, device_id: &str) -> bool {
    self.ids.contains(device_id)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }
}
