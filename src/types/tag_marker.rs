//! Shadow tag marker written onto each processed device.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Key/value pair written into a device's shadow document so the device
/// matches the dynamic-group predicate.
///
/// The value is chosen once per logical job (epoch milliseconds at job start)
/// and must be carried verbatim through every continuation: recomputing it
/// mid-job would split the cohort between two marker values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMarker {
  pub key: String,
  pub value: i64,
}

impl TagMarker {
  /// Creates a marker for a job starting now.
  pub fn new(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: Utc::now().timestamp_millis(),
    }
  }

  /// The shadow-index term matching devices already carrying this marker,
  /// e.g. `shadow.reported.fleetsurge_job:1700000000000`.
  pub fn index_term(&self) -> String {
    format!("shadow.reported.{}:{}", self.key, self.value)
  }
}
