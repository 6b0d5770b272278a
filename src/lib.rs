//! # fleetsurge
//!
//! Resumable, rate-limited bulk operations over large device fleets: tag
//! devices into a dynamic cohort, fill static groups from id lists, and
//! seed or delete device records, all against a provider rate ceiling and
//! an execution-time ceiling on the calling environment.
//!
//! ## Architecture
//!
//! One engine, three jobs. The engine is the rate-limited window driver
//! (`driver`), the continuation budget (`budget`) and the paginated index
//! source (`source`); the jobs (`jobs::tag`, `jobs::group_fill`,
//! `jobs::seed`) compose it with three collaborator seams: [FleetClient]
//! for the device provider, [BlobStore] for static id lists, and
//! [ContinuationSink] for dispatching resume invocations when the budget
//! runs out before the work does.
//!
//! State never crosses invocations through memory: a [JobInvocation] payload
//! carries everything a continuation needs, and its `resume` block is the
//! sole discriminator between fresh starts (which provision groups and the
//! rollout job) and resumes (which skip provisioning entirely).

pub mod blob;
pub mod budget;
pub mod config;
pub mod driver;
#[cfg(test)]
mod driver_test;
pub mod error;
pub mod fleet;
pub mod jobs;
pub mod provision;
pub mod sink;
pub mod source;
pub mod types;

pub use blob::BlobStore;
pub use budget::ContinuationBudget;
pub use config::EngineConfig;
pub use error::{BoxError, EngineError};
pub use fleet::FleetClient;
pub use jobs::{Deps, RunOutcome, run_invocation, run_until_complete};
pub use sink::{ChannelSink, ContinuationSink};
pub use types::{JobInvocation, TagMarker};
