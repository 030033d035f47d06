//! Cache state aggregate, mutation intents and the transition function.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::merge::shallow_merge;
use super::traits::Cacheable;
use crate::api::types::{RecordId, Shipment, ShipmentFilter, User, UserFilter};

/// Which of the two cached collections an intent targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
  Shipments,
  Users,
}

impl CollectionKind {
  pub const ALL: [CollectionKind; 2] = [CollectionKind::Shipments, CollectionKind::Users];

  pub fn as_str(&self) -> &'static str {
    match self {
      CollectionKind::Shipments => "shipments",
      CollectionKind::Users => "users",
    }
  }
}

impl std::fmt::Display for CollectionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.pad(self.as_str())
  }
}

/// Data, request state and filter for one collection.
///
/// The four concerns change independently; loading and error are transient
/// and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T, F> {
  pub data: Vec<T>,
  pub loading: bool,
  pub error: Option<String>,
  pub filter: F,
}

impl<T, F: Default> Default for Slot<T, F> {
  fn default() -> Self {
    Self {
      data: Vec::new(),
      loading: false,
      error: None,
      filter: F::default(),
    }
  }
}

impl<T, F> Slot<T, F>
where
  T: Cacheable,
  F: Serialize + DeserializeOwned,
{
  fn with_data(data: Vec<T>) -> Self
  where
    F: Default,
  {
    Self {
      data,
      ..Self::default()
    }
  }

  fn begin_load(&mut self) {
    self.loading = true;
    self.error = None;
  }

  fn complete_load(&mut self, data: Vec<T>) {
    self.data = data;
    self.loading = false;
    self.error = None;
  }

  /// Existing data is kept so the UI can keep showing stale rows.
  fn fail_load(&mut self, message: String) {
    self.loading = false;
    self.error = Some(message);
  }

  fn delete(&mut self, id: RecordId) {
    let before = self.data.len();
    self.data.retain(|record| record.id() != id);
    if self.data.len() == before {
      debug!(entity = T::entity_type(), id, "delete matched no record");
    }
  }

  /// Never inserts: an unknown id leaves the collection untouched.
  fn patch(&mut self, id: RecordId, fields: &Map<String, Value>) {
    let mut matched = false;
    for record in self.data.iter_mut().filter(|record| record.id() == id) {
      matched = true;
      match shallow_merge(&*record, fields, &["id"]) {
        Ok(merged) => *record = merged,
        Err(e) => warn!(entity = T::entity_type(), id, error = %e, "patch rejected"),
      }
    }
    if !matched {
      debug!(entity = T::entity_type(), id, "patch matched no record");
    }
  }

  /// Callers must not append an id that already exists.
  fn append(&mut self, record: T) {
    self.data.push(record);
  }

  fn set_filter(&mut self, fields: &Map<String, Value>) {
    match shallow_merge(&self.filter, fields, &[]) {
      Ok(filter) => self.filter = filter,
      Err(e) => warn!(entity = T::entity_type(), error = %e, "filter update rejected"),
    }
  }
}

/// Root aggregate held by the application cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState {
  pub shipments: Slot<Shipment, ShipmentFilter>,
  pub users: Slot<User, UserFilter>,
}

impl CacheState {
  /// Seed a fresh state from previously persisted collections.
  pub fn hydrated(shipments: Vec<Shipment>, users: Vec<User>) -> Self {
    Self {
      shipments: Slot::with_data(shipments),
      users: Slot::with_data(users),
    }
  }

  pub fn is_loading(&self, kind: CollectionKind) -> bool {
    match kind {
      CollectionKind::Shipments => self.shipments.loading,
      CollectionKind::Users => self.users.loading,
    }
  }

  pub fn is_empty(&self, kind: CollectionKind) -> bool {
    match kind {
      CollectionKind::Shipments => self.shipments.data.is_empty(),
      CollectionKind::Users => self.users.data.is_empty(),
    }
  }

  pub fn error(&self, kind: CollectionKind) -> Option<&str> {
    match kind {
      CollectionKind::Shipments => self.shipments.error.as_deref(),
      CollectionKind::Users => self.users.error.as_deref(),
    }
  }
}

/// A whole collection, as delivered by a completed load.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
  Shipments(Vec<Shipment>),
  Users(Vec<User>),
}

impl Records {
  pub fn kind(&self) -> CollectionKind {
    match self {
      Records::Shipments(_) => CollectionKind::Shipments,
      Records::Users(_) => CollectionKind::Users,
    }
  }

  pub fn len(&self) -> usize {
    match self {
      Records::Shipments(records) => records.len(),
      Records::Users(records) => records.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// A single record, as appended by a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
  Shipment(Shipment),
  User(User),
}

impl Entry {
  pub fn kind(&self) -> CollectionKind {
    match self {
      Entry::Shipment(_) => CollectionKind::Shipments,
      Entry::User(_) => CollectionKind::Users,
    }
  }
}

/// Mutation intents consumed by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
  BeginLoad(CollectionKind),
  CompleteLoad(Records),
  FailLoad(CollectionKind, String),
  DeleteRecord(CollectionKind, RecordId),
  PatchRecord(CollectionKind, RecordId, Map<String, Value>),
  AppendRecord(Entry),
  SetFilter(CollectionKind, Map<String, Value>),
  /// Back to the empty initialization shape (logout)
  Reset,
}

impl Intent {
  /// Build a patch intent from a JSON object. Non-object values patch nothing.
  pub fn patch(kind: CollectionKind, id: RecordId, fields: Value) -> Self {
    Intent::PatchRecord(kind, id, into_fields(fields))
  }

  /// Build a filter intent from a JSON object. `null` clears a filter field.
  pub fn filter(kind: CollectionKind, fields: Value) -> Self {
    Intent::SetFilter(kind, into_fields(fields))
  }

  /// Collection touched by this intent, `None` for intents touching both.
  pub fn collection(&self) -> Option<CollectionKind> {
    match self {
      Intent::BeginLoad(kind)
      | Intent::FailLoad(kind, _)
      | Intent::DeleteRecord(kind, _)
      | Intent::PatchRecord(kind, _, _)
      | Intent::SetFilter(kind, _) => Some(*kind),
      Intent::CompleteLoad(records) => Some(records.kind()),
      Intent::AppendRecord(entry) => Some(entry.kind()),
      Intent::Reset => None,
    }
  }

  /// Whether the snapshot must be rewritten after this intent is applied.
  pub fn persists(&self) -> bool {
    matches!(
      self,
      Intent::CompleteLoad(_)
        | Intent::DeleteRecord(..)
        | Intent::PatchRecord(..)
        | Intent::AppendRecord(_)
    )
  }
}

fn into_fields(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}

/// Apply one intent. Only the slot named by the intent is touched.
pub fn reduce(mut state: CacheState, intent: Intent) -> CacheState {
  match intent {
    Intent::BeginLoad(CollectionKind::Shipments) => state.shipments.begin_load(),
    Intent::BeginLoad(CollectionKind::Users) => state.users.begin_load(),

    Intent::CompleteLoad(Records::Shipments(data)) => state.shipments.complete_load(data),
    Intent::CompleteLoad(Records::Users(data)) => state.users.complete_load(data),

    Intent::FailLoad(CollectionKind::Shipments, message) => state.shipments.fail_load(message),
    Intent::FailLoad(CollectionKind::Users, message) => state.users.fail_load(message),

    Intent::DeleteRecord(CollectionKind::Shipments, id) => state.shipments.delete(id),
    Intent::DeleteRecord(CollectionKind::Users, id) => state.users.delete(id),

    Intent::PatchRecord(CollectionKind::Shipments, id, fields) => {
      state.shipments.patch(id, &fields)
    }
    Intent::PatchRecord(CollectionKind::Users, id, fields) => state.users.patch(id, &fields),

    Intent::AppendRecord(Entry::Shipment(record)) => state.shipments.append(record),
    Intent::AppendRecord(Entry::User(record)) => state.users.append(record),

    Intent::SetFilter(CollectionKind::Shipments, fields) => state.shipments.set_filter(&fields),
    Intent::SetFilter(CollectionKind::Users, fields) => state.users.set_filter(&fields),

    Intent::Reset => state = CacheState::default(),
  }
  state
}
