//! Persisted projection of the cache: both collections plus a write timestamp.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::state::CacheState;
use crate::api::types::{Shipment, User};

/// Durable-store key for the snapshot. Bump the version when the format changes
/// so older payloads are ignored instead of misparsed.
pub const SNAPSHOT_KEY: &str = "freightdesk.snapshot.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
  pub shipments: Vec<Shipment>,
  pub users: Vec<User>,
  /// Unix epoch milliseconds of the write
  pub timestamp: i64,
}

impl PersistedSnapshot {
  /// Capture the collections of `state`. Loading, error and filters are left out.
  pub fn capture(state: &CacheState) -> Self {
    Self {
      shipments: state.shipments.data.clone(),
      users: state.users.data.clone(),
      timestamp: Utc::now().timestamp_millis(),
    }
  }

  pub fn encode(&self) -> Result<String> {
    serde_json::to_string(self).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))
  }

  /// Decode a stored snapshot.
  ///
  /// Anything that is not an object with array-typed `shipments` and `users`
  /// whose every element decodes is rejected as a whole.
  pub fn decode(raw: &str) -> Option<Self> {
    let value: Value = match serde_json::from_str(raw) {
      Ok(value) => value,
      Err(e) => {
        debug!(error = %e, "snapshot is not valid JSON");
        return None;
      }
    };

    let object = value.as_object()?;
    let shipments = object.get("shipments")?.as_array()?;
    let users = object.get("users")?.as_array()?;

    let shipments = decode_all::<Shipment>(shipments)?;
    let users = decode_all::<User>(users)?;
    let timestamp = object.get("timestamp").and_then(Value::as_i64).unwrap_or(0);

    Some(Self {
      shipments,
      users,
      timestamp,
    })
  }

  pub fn into_state(self) -> CacheState {
    CacheState::hydrated(self.shipments, self.users)
  }
}

fn decode_all<T: serde::de::DeserializeOwned>(items: &[Value]) -> Option<Vec<T>> {
  items
    .iter()
    .map(|item| T::deserialize(item))
    .collect::<Result<Vec<T>, _>>()
    .map_err(|e| debug!(error = %e, "snapshot record is malformed"))
    .ok()
}
