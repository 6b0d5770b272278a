//! One page of a cursor-based fleet-index query.

use serde::{Deserialize, Serialize};

/// A page of device ids plus the cursor for the next page.
/// `next_token == None` means the query is exhausted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicePage {
  pub device_ids: Vec<String>,
  pub next_token: Option<String>,
}
