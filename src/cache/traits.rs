//! Core traits and types for the caching system.

use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::api::types::{RecordId, Shipment, ShipmentFilter, User, UserFilter};

/// Trait for records that can be held in a cached collection.
///
/// Implementors must provide a unique, immutable id used for delete/patch lookups.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Unique identifier for this record
  fn id(&self) -> RecordId;

  /// Entity type name used in logs (e.g., "shipment", "user")
  fn entity_type() -> &'static str;
}

impl Cacheable for Shipment {
  fn id(&self) -> RecordId {
    self.id
  }

  fn entity_type() -> &'static str {
    "shipment"
  }
}

impl Cacheable for User {
  fn id(&self) -> RecordId {
    self.id
  }

  fn entity_type() -> &'static str {
    "user"
  }
}

/// Result of a remote `fetch_all`: the full collection, or an error message.
pub type FetchOutcome<T> = Result<Vec<T>, String>;

/// Remote collection of one resource type.
///
/// Expected failures (transport errors, 4xx/5xx, undecodable bodies) must be
/// reported as `Err(message)`, never by panicking. The returned future owns
/// everything it needs so it can be spawned.
pub trait ResourceClient<T, F>: Send + Sync {
  fn fetch_all(&self, filter: &F) -> BoxFuture<'static, FetchOutcome<T>>;
}

/// The two remote collections the cache refreshes from.
#[derive(Clone)]
pub struct Remotes {
  pub shipments: Arc<dyn ResourceClient<Shipment, ShipmentFilter>>,
  pub users: Arc<dyn ResourceClient<User, UserFilter>>,
}

impl Remotes {
  pub fn new(
    shipments: Arc<dyn ResourceClient<Shipment, ShipmentFilter>>,
    users: Arc<dyn ResourceClient<User, UserFilter>>,
  ) -> Self {
    Self { shipments, users }
  }
}
