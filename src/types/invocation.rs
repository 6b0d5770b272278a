//! Invocation payloads: the engine's external wire format.
//!
//! A payload without a `resume` block starts a fresh job (provisioning runs);
//! a payload with one continues a prior invocation (provisioning is skipped).
//! The presence of `resume` is the sole discriminator.

use serde::{Deserialize, Serialize};

use super::TagMarker;

/// Resume block for cursor-based jobs (tagging, delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagJobResume {
  /// Marker chosen at job start; reused verbatim.
  pub marker: TagMarker,
  /// Cursor returned by the last consumed page.
  pub next_token: String,
  /// Pages consumed so far across all invocations.
  pub pages_done: u32,
  /// Devices processed so far across all invocations.
  pub processed: u64,
}

/// Resume block for cursor-based jobs without a marker (delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorResume {
  /// Cursor returned by the last consumed page.
  pub next_token: String,
  /// Pages consumed so far across all invocations.
  pub pages_done: u32,
  /// Devices processed so far across all invocations.
  pub processed: u64,
}

/// Resume block for list-based jobs (group fill, seed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResume {
  /// First unprocessed list index.
  pub next_index: usize,
  /// Devices processed so far across all invocations.
  pub processed: u64,
}

/// Payload for the shadow-tagging job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagJobInvocation {
  /// Job name; configured default when absent.
  pub job_name: Option<String>,
  /// Fleet-index predicate; configured default when absent.
  pub fleet_query: Option<String>,
  /// Blob key of the delimited exclude list.
  pub exclude_list: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resume: Option<TagJobResume>,
}

/// Payload for the static group-fill job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFillInvocation {
  /// Static group to fill.
  pub group_name: String,
  /// Blob key of the delimited device list.
  pub list_ref: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resume: Option<ListResume>,
}

/// What the seed job should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
  /// Create devices under the demo prefix; configured default count when
  /// absent.
  Seed { count: Option<u64> },
  /// Delete every device matching `<prefix>*`.
  Delete,
}

/// Payload for the seed/delete job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedInvocation {
  pub mode: SeedMode,
  /// Device-name prefix; configured default when absent.
  pub prefix: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub list_resume: Option<ListResume>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cursor_resume: Option<CursorResume>,
}

/// One invocation of the engine, fresh or resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobInvocation {
  Tag(TagJobInvocation),
  GroupFill(GroupFillInvocation),
  Seed(SeedInvocation),
}

impl JobInvocation {
  /// True when this payload resumes prior work (provisioning is skipped).
  pub fn is_resume(&self) -> bool {
    match self {
      JobInvocation::Tag(p) => p.resume.is_some(),
      JobInvocation::GroupFill(p) => p.resume.is_some(),
      JobInvocation::Seed(p) => p.list_resume.is_some() || p.cursor_resume.is_some(),
    }
  }
}
