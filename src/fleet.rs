//! Fleet-provider collaborator trait.
//!
//! Everything the engine asks of the device-management provider goes through
//! [FleetClient]. Per-device operations are assumed idempotent; the engine
//! never inspects their semantics beyond success or failure.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BoxError;
use crate::types::DevicePage;

/// Fleet-index coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingMode {
  Off,
  Registry,
  RegistryAndShadow,
}

/// Fleet-index build status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
  Building,
  Rebuilding,
  Active,
}

/// Request to create the continuous rollout job.
#[derive(Debug, Clone)]
pub struct RolloutJobRequest {
  pub job_id: String,
  /// Group the job targets (dynamic group id/arn).
  pub target: String,
  /// Job document delivered to each device.
  pub document: Value,
  /// Provider rollout ceiling, executions per minute.
  pub max_per_minute: u32,
}

/// Remote device-management provider.
#[async_trait]
pub trait FleetClient: Send + Sync {
  async fn indexing_mode(&self) -> Result<IndexingMode, BoxError>;

  /// Requests registry-and-shadow indexing. The index builds asynchronously;
  /// callers poll [FleetClient::index_status] until `Active`.
  async fn enable_registry_shadow_indexing(&self) -> Result<(), BoxError>;

  async fn index_status(&self) -> Result<IndexStatus, BoxError>;

  /// Creates a static group; returns its name.
  async fn create_static_group(&self, group_name: &str) -> Result<String, BoxError>;

  /// Creates a dynamic group whose membership is computed from `query`;
  /// returns the group id/arn used as a job target.
  async fn create_dynamic_group(&self, group_name: &str, query: &str) -> Result<String, BoxError>;

  async fn create_rollout_job(&self, request: &RolloutJobRequest) -> Result<(), BoxError>;

  /// One page of the fleet index matching `query`, at most `max_results` ids.
  async fn search_index(
    &self,
    query: &str,
    max_results: usize,
    next_token: Option<&str>,
  ) -> Result<DevicePage, BoxError>;

  /// Writes `key: value` under `shadow.reported` of one device.
  async fn update_shadow(&self, device_id: &str, key: &str, value: i64) -> Result<(), BoxError>;

  async fn add_to_group(&self, device_id: &str, group_name: &str) -> Result<(), BoxError>;

  async fn create_device(&self, device_id: &str) -> Result<(), BoxError>;

  async fn delete_device(&self, device_id: &str) -> Result<(), BoxError>;
}
