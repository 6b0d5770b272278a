//! In-memory collaborator fakes shared by the job tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::blob::BlobStore;
use crate::config::EngineConfig;
use crate::error::BoxError;
use crate::fleet::{FleetClient, IndexStatus, IndexingMode, RolloutJobRequest};
use crate::sink::ContinuationSink;
use crate::types::{DevicePage, JobInvocation};

use super::Deps;

/// Mutable provider state behind [FakeFleet].
#[derive(Debug, Default)]
pub struct FleetState {
  pub indexing_enabled: bool,
  /// Polls returning `Building` before the index goes `Active`.
  pub polls_until_active: u32,
  pub enable_indexing_calls: u32,
  pub static_groups: Vec<String>,
  /// (name, query) pairs.
  pub dynamic_groups: Vec<(String, String)>,
  pub rollout_jobs: Vec<(String, String, u32)>,
  /// Stable result set served by `search_index`, in listing order.
  pub listing: Vec<String>,
  pub search_queries: Vec<String>,
  /// (device_id, key, value) in dispatch order.
  pub shadow_writes: Vec<(String, String, i64)>,
  /// group -> members in dispatch order.
  pub group_members: BTreeMap<String, Vec<String>>,
  pub created: Vec<String>,
  pub deleted: Vec<String>,
  /// Device ids whose per-device calls fail.
  pub fail_devices: HashSet<String>,
}

/// In-memory [FleetClient]. Search pagination serves `listing` in order with
/// the next index as the opaque token; the query string is recorded, not
/// evaluated.
#[derive(Debug, Default)]
pub struct FakeFleet {
  pub state: Mutex<FleetState>,
}

impl FakeFleet {
  pub fn with_listing(ids: Vec<String>) -> Arc<Self> {
    let fleet = Self::default();
    fleet.state.lock().unwrap().listing = ids;
    Arc::new(fleet)
  }
}

#[async_trait]
impl FleetClient for FakeFleet {
  async fn indexing_mode(&self) -> Result<IndexingMode, BoxError> {
    let state = self.state.lock().unwrap();
    Ok(if state.indexing_enabled {
      IndexingMode::RegistryAndShadow
    } else {
      IndexingMode::Off
    })
  }

  async fn enable_registry_shadow_indexing(&self) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    state.enable_indexing_calls += 1;
    state.indexing_enabled = true;
    Ok(())
  }

  async fn index_status(&self) -> Result<IndexStatus, BoxError> {
    let mut state = self.state.lock().unwrap();
    if state.polls_until_active > 0 {
      state.polls_until_active -= 1;
      Ok(IndexStatus::Building)
    } else {
      Ok(IndexStatus::Active)
    }
  }

  async fn create_static_group(&self, group_name: &str) -> Result<String, BoxError> {
    let mut state = self.state.lock().unwrap();
    state.static_groups.push(group_name.to_string());
    Ok(group_name.to_string())
  }

  async fn create_dynamic_group(&self, group_name: &str, query: &str) -> Result<String, BoxError> {
    let mut state = self.state.lock().unwrap();
    state
      .dynamic_groups
      .push((group_name.to_string(), query.to_string()));
    Ok(format!("arn:group/{group_name}"))
  }

  async fn create_rollout_job(&self, request: &RolloutJobRequest) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    state.rollout_jobs.push((
      request.job_id.clone(),
      request.target.clone(),
      request.max_per_minute,
    ));
    Ok(())
  }

  async fn search_index(
    &self,
    query: &str,
    max_results: usize,
    next_token: Option<&str>,
  ) -> Result<DevicePage, BoxError> {
    let mut state = self.state.lock().unwrap();
    state.search_queries.push(query.to_string());
    let start: usize = match next_token {
      Some(t) => t.parse()?,
      None => 0,
    };
    let end = (start + max_results).min(state.listing.len());
    let next_token = (end < state.listing.len()).then(|| end.to_string());
    Ok(DevicePage {
      device_ids: state.listing[start..end].to_vec(),
      next_token,
    })
  }

  async fn update_shadow(&self, device_id: &str, key: &str, value: i64) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    if state.fail_devices.contains(device_id) {
      return Err(format!("shadow update rejected for {device_id}").into());
    }
    state
      .shadow_writes
      .push((device_id.to_string(), key.to_string(), value));
    Ok(())
  }

  async fn add_to_group(&self, device_id: &str, group_name: &str) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    if state.fail_devices.contains(device_id) {
      return Err(format!("group add rejected for {device_id}").into());
    }
    state
      .group_members
      .entry(group_name.to_string())
      .or_default()
      .push(device_id.to_string());
    Ok(())
  }

  async fn create_device(&self, device_id: &str) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    state.created.push(device_id.to_string());
    Ok(())
  }

  async fn delete_device(&self, device_id: &str) -> Result<(), BoxError> {
    let mut state = self.state.lock().unwrap();
    state.deleted.push(device_id.to_string());
    Ok(())
  }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct FakeBlobs {
  blobs: HashMap<String, String>,
}

impl FakeBlobs {
  pub fn with(key: &str, text: &str) -> Arc<Self> {
    let mut blobs = HashMap::new();
    blobs.insert(key.to_string(), text.to_string());
    Arc::new(Self { blobs })
  }
}

#[async_trait]
impl BlobStore for FakeBlobs {
  async fn fetch(&self, key: &str) -> Result<String, BoxError> {
    self
      .blobs
      .get(key)
      .cloned()
      .ok_or_else(|| format!("no such blob: {key}").into())
  }
}

/// Sink that records every dispatched invocation; can be set to fail.
#[derive(Debug, Default)]
pub struct RecordingSink {
  pub dispatched: Mutex<Vec<JobInvocation>>,
  pub fail: bool,
}

impl RecordingSink {
  pub fn failing() -> Arc<Self> {
    Arc::new(Self {
      dispatched: Mutex::new(vec![]),
      fail: true,
    })
  }

  pub fn take(&self) -> Vec<JobInvocation> {
    std::mem::take(&mut self.dispatched.lock().unwrap())
  }
}

#[async_trait]
impl ContinuationSink for RecordingSink {
  async fn dispatch(&self, invocation: JobInvocation) -> Result<(), BoxError> {
    if self.fail {
      return Err("sink unavailable".into());
    }
    self.dispatched.lock().unwrap().push(invocation);
    Ok(())
  }
}

/// Deps over the fakes, with zero pacing so tests run instantly.
pub fn test_deps(
  fleet: Arc<FakeFleet>,
  blobs: Arc<FakeBlobs>,
  sink: Arc<RecordingSink>,
) -> Deps {
  let config = EngineConfig {
    pacing_ms: 0,
    index_poll_interval_ms: 0,
    ..EngineConfig::default()
  };
  Deps {
    fleet,
    blobs,
    sink,
    config,
  }
}
