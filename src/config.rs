//! Engine configuration, fixed at deploy time.
//!
//! Loaded from `FLEETSURGE_*` environment variables; every field has a
//! default so tests and local runs need no environment at all.

use config::{Config, Environment};
use serde::Deserialize;
use tokio::time::Duration;

use crate::error::EngineError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "FLEETSURGE";

/// Deploy-time configuration for all three jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Shadow key reserved for job markers; must not collide with normal
  /// shadow use by the application.
  pub shadow_key: String,
  /// Provider ceiling for rollout-job executions per minute.
  pub rollout_per_minute: u32,
  /// Fleet-index page size; also the shadow-update window size.
  pub search_page_size: usize,
  /// Pages consumed per invocation before a cursor continuation.
  pub max_search_pages: u32,
  /// Interval between index-status polls while the fleet index builds.
  pub index_poll_interval_ms: u64,
  /// Provider ceiling for group-membership writes per second.
  pub group_add_per_second: usize,
  /// Provider ceiling for device creation per second.
  pub create_per_second: usize,
  /// Provider ceiling for device deletion per second; also the delete-mode
  /// page size.
  pub delete_per_second: usize,
  /// Wall-clock budget per invocation, strictly below the platform's hard
  /// execution ceiling.
  pub continuation_margin_ms: u64,
  /// The rate-limit period: minimum duration of one window.
  pub pacing_ms: u64,
  /// Job name used when the start payload carries none.
  pub default_job_name: String,
  /// Fleet query used when the start payload carries none.
  pub default_fleet_query: String,
  /// Delimiter of blob-stored device lists.
  pub list_delimiter: String,
  /// Name prefix for seeded demo devices.
  pub demo_prefix: String,
  /// Devices created by seed mode when the payload carries no count.
  pub default_seed_count: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      shadow_key: "fleetsurge_job".to_string(),
      rollout_per_minute: 1000,
      search_page_size: 250,
      max_search_pages: 200,
      index_poll_interval_ms: 5000,
      group_add_per_second: 100,
      create_per_second: 100,
      delete_per_second: 100,
      continuation_margin_ms: 600_000,
      pacing_ms: 1000,
      default_job_name: "fleetsurge".to_string(),
      default_fleet_query: "thingName:*".to_string(),
      list_delimiter: "\r\n".to_string(),
      demo_prefix: "fleetsurge-demo-".to_string(),
      default_seed_count: 1000,
    }
  }
}

impl EngineConfig {
  /// Loads configuration from `FLEETSURGE_*` environment variables on top of
  /// the defaults.
  pub fn from_env() -> Result<Self, EngineError> {
    let cfg = Config::builder()
      .add_source(Environment::with_prefix(ENV_PREFIX))
      .build()?;
    Ok(cfg.try_deserialize()?)
  }

  pub fn pacing(&self) -> Duration {
    Duration::from_millis(self.pacing_ms)
  }

  pub fn continuation_margin(&self) -> Duration {
    Duration::from_millis(self.continuation_margin_ms)
  }

  pub fn index_poll_interval(&self) -> Duration {
    Duration::from_millis(self.index_poll_interval_ms)
  }
}
