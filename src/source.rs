//! Paginated source adapter over the fleet index.

use std::sync::Arc;

use tracing::instrument;

use crate::error::{BoxError, EngineError};
use crate::fleet::FleetClient;
use crate::types::DevicePage;

/// Conjoins the exclusion clause onto a query when an exclude group exists.
///
/// Exclusion is enforced at the query layer; callers that race a just-created
/// exclude group against index propagation filter client-side as well.
pub fn with_exclusion(query: &str, exclude_group: Option<&str>) -> String {
  match exclude_group {
    Some(group) => format!("({query}) AND NOT thingGroupNames:{group}"),
    None => query.to_string(),
  }
}

/// Cursor-based fleet-index query yielding one page of device ids at a time.
///
/// Page size is capped at the rate-limit window for the consuming job, so
/// one page is one window and the budget is checked once per page.
pub struct FleetIndexSource {
  fleet: Arc<dyn FleetClient>,
  query: String,
  page_size: usize,
}

impl FleetIndexSource {
  pub fn new(
    fleet: Arc<dyn FleetClient>,
    query: impl Into<String>,
    exclude_group: Option<&str>,
    page_size: usize,
  ) -> Self {
    let query = with_exclusion(&query.into(), exclude_group);
    Self {
      fleet,
      query,
      page_size,
    }
  }

  /// The effective query, exclusion clause included.
  pub fn query(&self) -> &str {
    &self.query
  }

  /// Fetches the page at `next_token` (`None` for the first page). A missing
  /// token on the returned page means the query is exhausted.
  #[instrument(level = "trace", skip(self), fields(query = %self.query))]
  pub async fn next_page(&self, next_token: Option<&str>) -> Result<DevicePage, EngineError> {
    self
      .fleet
      .search_index(&self.query, self.page_size, next_token)
      .await
      .map_err(|e: BoxError| EngineError::SourceRead(e))
  }
}
