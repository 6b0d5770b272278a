//! Value types threaded through the engine.
//!
//! Everything a continuation needs to resume a job rides in these types as
//! JSON; nothing is shared between invocations through memory.

mod device_page;
mod exclude_set;
mod invocation;
mod job_descriptor;
mod tag_marker;
mod window_report;

pub use device_page::DevicePage;
pub use exclude_set::ExcludeSet;
pub use invocation::{
  CursorResume, GroupFillInvocation, JobInvocation, ListResume, SeedInvocation, SeedMode,
  TagJobInvocation, TagJobResume,
};
pub use job_descriptor::JobDescriptor;
pub use tag_marker::TagMarker;
pub use window_report::{ItemFailure, WindowReport};
