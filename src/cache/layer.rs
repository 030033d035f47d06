//! Application cache: the canonical in-memory copy of shipments and users.

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::snapshot::{PersistedSnapshot, SNAPSHOT_KEY};
use super::state::{reduce, CacheState, CollectionKind, Intent, Records};
use super::traits::Remotes;
use super::watch::{CacheChange, Subscription, Watchers};
use crate::api::types::{Shipment, User};
use crate::store::DurableStore;

/// Identifies one fetch. Only the latest ticket of the current session may
/// complete a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
  session: u64,
  request: u64,
}

/// Outcome of a spawned fetch, delivered back to the owning task.
#[derive(Debug)]
struct Completion {
  kind: CollectionKind,
  ticket: Ticket,
  outcome: Result<Records, String>,
}

/// One value per collection.
#[derive(Debug, Clone, Copy, Default)]
struct PerCollection<T> {
  shipments: T,
  users: T,
}

impl<T: Copy> PerCollection<T> {
  fn both(value: T) -> Self {
    Self {
      shipments: value,
      users: value,
    }
  }

  fn get(&self, kind: CollectionKind) -> T {
    match kind {
      CollectionKind::Shipments => self.shipments,
      CollectionKind::Users => self.users,
    }
  }

  fn set(&mut self, kind: CollectionKind, value: T) {
    match kind {
      CollectionKind::Shipments => self.shipments = value,
      CollectionKind::Users => self.users = value,
    }
  }
}

/// Holds the cache state and coordinates hydration, persistence and refresh.
///
/// All transitions happen on the task that owns the cache. Network fetches run
/// on spawned tasks and report back through a channel drained by [`poll`] or
/// [`next_completion`], so a transition never observes a half-applied one.
///
/// Auto-refresh is armed per collection. Applying a load result (success or
/// failure) disarms it. Deleting, patching, appending, changing the filter,
/// resetting or reactivating the context re-arms it. An endpoint that keeps
/// failing or keeps answering with an empty list is therefore not polled in a
/// loop.
///
/// A completion is applied only if it belongs to the most recent fetch of its
/// collection in the current session. Responses that were superseded by a
/// newer refresh, or that arrive after a logout, are dropped.
///
/// [`poll`]: ApplicationCache::poll
/// [`next_completion`]: ApplicationCache::next_completion
pub struct ApplicationCache {
  state: CacheState,
  store: DurableStore,
  remotes: Remotes,
  /// Externally supplied "UI context is active" flag (e.g. authenticated)
  active: bool,
  revision: u64,
  session: u64,
  next_request: u64,
  in_flight: PerCollection<Option<Ticket>>,
  armed: PerCollection<bool>,
  fetches_issued: u64,
  watchers: Watchers,
  completions_tx: mpsc::UnboundedSender<Completion>,
  completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl ApplicationCache {
  /// Build the cache, seeding it from the persisted snapshot when one is usable.
  ///
  /// Never fails: an absent or malformed snapshot yields empty collections.
  pub fn initialize(store: DurableStore, remotes: Remotes, active: bool) -> Self {
    let state = Self::hydrate(&store);
    let (completions_tx, completions_rx) = mpsc::unbounded_channel();

    let mut cache = Self {
      state,
      store,
      remotes,
      active,
      revision: 0,
      session: 0,
      next_request: 0,
      in_flight: PerCollection::default(),
      armed: PerCollection::both(true),
      fetches_issued: 0,
      watchers: Watchers::default(),
      completions_tx,
      completions_rx,
    };
    cache.settle();
    cache
  }

  fn hydrate(store: &DurableStore) -> CacheState {
    let Some(raw) = store.read(SNAPSHOT_KEY) else {
      debug!("no persisted snapshot");
      return CacheState::default();
    };

    match PersistedSnapshot::decode(&raw) {
      Some(snapshot) => {
        info!(
          shipments = snapshot.shipments.len(),
          users = snapshot.users.len(),
          written_at = snapshot.timestamp,
          "hydrated cache from snapshot"
        );
        snapshot.into_state()
      }
      None => {
        warn!("discarding malformed snapshot");
        store.remove(SNAPSHOT_KEY);
        CacheState::default()
      }
    }
  }

  /// Apply a mutation intent, notify subscribers, persist, then settle.
  pub fn dispatch(&mut self, intent: Intent) {
    self.apply(intent);
    self.settle();
  }

  fn apply(&mut self, intent: Intent) {
    let collection = intent.collection();
    let persists = intent.persists();
    let clears = matches!(intent, Intent::Reset);
    match (&intent, collection) {
      (Intent::Reset, _) => self.armed = PerCollection::both(true),
      (Intent::BeginLoad(_), _) => {}
      (Intent::CompleteLoad(_) | Intent::FailLoad(..), Some(kind)) => self.armed.set(kind, false),
      (_, Some(kind)) => self.armed.set(kind, true),
      (_, None) => {}
    }
    debug!(?collection, intent = intent_name(&intent), "applying intent");

    let state = std::mem::take(&mut self.state);
    self.state = reduce(state, intent);
    self.revision += 1;

    // Views see the new state before the snapshot write happens
    self.watchers.notify(CacheChange {
      revision: self.revision,
      collection,
    });

    if persists {
      self.persist();
    } else if clears {
      self.store.remove(SNAPSHOT_KEY);
    }
  }

  fn persist(&self) {
    match PersistedSnapshot::capture(&self.state).encode() {
      Ok(raw) => self.store.write(SNAPSHOT_KEY, &raw),
      Err(e) => warn!(error = %e, "snapshot not written"),
    }
  }

  /// Auto-refresh: fetch every empty, idle, armed collection while the
  /// context is active.
  pub fn settle(&mut self) {
    if !self.active {
      return;
    }
    for kind in CollectionKind::ALL {
      if self.armed.get(kind) && self.state.is_empty(kind) && !self.state.is_loading(kind) {
        self.start_fetch(kind);
      }
    }
  }

  /// Explicit retry: always issues a fetch, superseding one in flight.
  pub fn refresh(&mut self, kind: CollectionKind) {
    self.start_fetch(kind);
    self.settle();
  }

  fn start_fetch(&mut self, kind: CollectionKind) {
    self.next_request += 1;
    let ticket = Ticket {
      session: self.session,
      request: self.next_request,
    };
    self.in_flight.set(kind, Some(ticket));
    self.apply(Intent::BeginLoad(kind));

    let fetch: BoxFuture<'static, Result<Records, String>> = match kind {
      CollectionKind::Shipments => self
        .remotes
        .shipments
        .fetch_all(&self.state.shipments.filter)
        .map(|outcome| outcome.map(Records::Shipments))
        .boxed(),
      CollectionKind::Users => self
        .remotes
        .users
        .fetch_all(&self.state.users.filter)
        .map(|outcome| outcome.map(Records::Users))
        .boxed(),
    };
    self.fetches_issued += 1;
    debug!(collection = %kind, request = ticket.request, "fetch issued");

    let handle = match tokio::runtime::Handle::try_current() {
      Ok(handle) => handle,
      Err(e) => {
        warn!(collection = %kind, error = %e, "no async runtime, fetch not started");
        self.in_flight.set(kind, None);
        self.apply(Intent::FailLoad(kind, format!("fetch not started: {}", e)));
        return;
      }
    };

    let tx = self.completions_tx.clone();
    handle.spawn(async move {
      let outcome = fetch.await;
      // Receiver lives as long as the cache
      let _ = tx.send(Completion {
        kind,
        ticket,
        outcome,
      });
    });
  }

  /// Apply completions that have already arrived. Returns how many were received.
  pub fn poll(&mut self) -> usize {
    let mut received = 0;
    while let Ok(completion) = self.completions_rx.try_recv() {
      self.complete(completion);
      received += 1;
    }
    received
  }

  /// Wait for the next fetch completion and apply it.
  ///
  /// Returns `false` immediately when nothing is in flight.
  pub async fn next_completion(&mut self) -> bool {
    if !self.has_in_flight() {
      return false;
    }
    match self.completions_rx.recv().await {
      Some(completion) => {
        self.complete(completion);
        true
      }
      None => false,
    }
  }

  /// Drive completions until no fetch is in flight.
  pub async fn wait_idle(&mut self) {
    while self.next_completion().await {}
  }

  fn complete(&mut self, completion: Completion) {
    let Completion {
      kind,
      ticket,
      outcome,
    } = completion;

    if self.in_flight.get(kind) != Some(ticket) {
      warn!(
        collection = %kind,
        session = ticket.session,
        request = ticket.request,
        "dropping superseded response"
      );
      return;
    }
    self.in_flight.set(kind, None);

    let intent = match outcome {
      Ok(records) => {
        debug!(collection = %kind, records = records.len(), "fetch succeeded");
        Intent::CompleteLoad(records)
      }
      Err(message) => {
        warn!(collection = %kind, error = %message, "fetch failed");
        Intent::FailLoad(kind, message)
      }
    };
    self.dispatch(intent);
  }

  /// Toggle the UI-context flag and re-evaluate auto-refresh.
  ///
  /// Becoming active re-arms both collections, so one that was left empty by
  /// an earlier failed or empty load is fetched again.
  pub fn set_active(&mut self, active: bool) {
    if active && !self.active {
      self.armed = PerCollection::both(true);
    }
    self.active = active;
    self.settle();
  }

  /// Drop the persisted snapshot and return to the empty initialization shape.
  ///
  /// Fetches still in flight belong to the old session and will be discarded.
  pub fn logout(&mut self) {
    self.session += 1;
    self.in_flight = PerCollection::default();
    self.active = false;
    self.apply(Intent::Reset);
    info!(session = self.session, "cache cleared");
  }

  pub fn subscribe(&self) -> Subscription {
    self.watchers.subscribe()
  }

  pub fn state(&self) -> &CacheState {
    &self.state
  }

  pub fn shipments(&self) -> &[Shipment] {
    &self.state.shipments.data
  }

  pub fn users(&self) -> &[User] {
    &self.state.users.data
  }

  /// Shipments passing the current shipment filter.
  pub fn visible_shipments(&self) -> Vec<&Shipment> {
    let filter = &self.state.shipments.filter;
    self.shipments().iter().filter(|s| filter.matches(s)).collect()
  }

  /// Users passing the current user filter.
  pub fn visible_users(&self) -> Vec<&User> {
    let filter = &self.state.users.filter;
    self.users().iter().filter(|u| filter.matches(u)).collect()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn has_in_flight(&self) -> bool {
    CollectionKind::ALL
      .into_iter()
      .any(|kind| self.in_flight.get(kind).is_some())
  }

  pub fn revision(&self) -> u64 {
    self.revision
  }

  /// Number of `fetch_all` calls issued since construction.
  pub fn fetches_issued(&self) -> u64 {
    self.fetches_issued
  }
}

fn intent_name(intent: &Intent) -> &'static str {
  match intent {
    Intent::BeginLoad(_) => "begin_load",
    Intent::CompleteLoad(_) => "complete_load",
    Intent::FailLoad(..) => "fail_load",
    Intent::DeleteRecord(..) => "delete_record",
    Intent::PatchRecord(..) => "patch_record",
    Intent::AppendRecord(_) => "append_record",
    Intent::SetFilter(..) => "set_filter",
    Intent::Reset => "reset",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{ShipmentStatus, User, UserRole};
  use crate::cache::testing::{remotes, FakeClient};
  use crate::store::testing::FailingBackend;
  use serde_json::json;

  fn shipment(id: u64, status: ShipmentStatus) -> Shipment {
    Shipment::new(id, status)
  }

  fn inactive(store: &DurableStore) -> ApplicationCache {
    ApplicationCache::initialize(
      store.clone(),
      remotes(&FakeClient::empty(), &FakeClient::empty()),
      false,
    )
  }

  fn stored_snapshot(store: &DurableStore) -> Option<PersistedSnapshot> {
    store
      .read(SNAPSHOT_KEY)
      .and_then(|raw| PersistedSnapshot::decode(&raw))
  }

  #[test]
  fn test_initialize_falls_back_to_empty_state() {
    let payloads = [
      None,
      Some("{"),
      Some("[1, 2]"),
      Some(r#"{"shipments": null, "users": []}"#),
      Some(r#"{"shipments": [], "users": {"id": 1}}"#),
      Some(r#"{"shipments": [{"id": 1, "status": "lost"}], "users": []}"#),
    ];

    for payload in payloads {
      let store = DurableStore::in_memory();
      if let Some(raw) = payload {
        store.write(SNAPSHOT_KEY, raw);
      }

      let cache = inactive(&store);
      assert_eq!(cache.state(), &CacheState::default(), "payload {:?}", payload);
      assert_eq!(store.read(SNAPSHOT_KEY), None);
    }
  }

  #[test]
  fn test_initialize_hydrates_valid_snapshot() {
    let store = DurableStore::in_memory();
    store.write(
      SNAPSHOT_KEY,
      r#"{"shipments": [{"id": 1, "status": "pending", "cargo": "steel"}],
          "users": [{"id": 5, "role": "admin", "isApproved": true}],
          "timestamp": 1700000000000}"#,
    );

    let cache = inactive(&store);
    assert_eq!(cache.shipments().len(), 1);
    assert_eq!(cache.shipments()[0].detail_text("cargo").as_deref(), Some("steel"));
    assert!(cache.users()[0].is_approved);
    assert!(!cache.state().shipments.loading);
    assert_eq!(cache.fetches_issued(), 0);
  }

  #[test]
  fn test_complete_load_persists_both_collections() {
    let store = DurableStore::in_memory();
    let mut cache = inactive(&store);

    cache.dispatch(Intent::CompleteLoad(Records::Users(vec![User::new(
      5,
      UserRole::Admin,
    )])));
    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      1,
      ShipmentStatus::Pending,
    )])));

    let snapshot = stored_snapshot(&store).unwrap();
    assert_eq!(snapshot.shipments, vec![shipment(1, ShipmentStatus::Pending)]);
    assert_eq!(snapshot.users, vec![User::new(5, UserRole::Admin)]);
    assert!(snapshot.timestamp > 0);
  }

  #[test]
  fn test_transient_intents_do_not_write_snapshot() {
    let store = DurableStore::in_memory();
    let mut cache = inactive(&store);

    cache.dispatch(Intent::BeginLoad(CollectionKind::Shipments));
    cache.dispatch(Intent::FailLoad(CollectionKind::Shipments, "offline".into()));
    cache.dispatch(Intent::filter(CollectionKind::Users, json!({"role": "driver"})));

    assert_eq!(store.read(SNAPSHOT_KEY), None);
  }

  #[test]
  fn test_persistence_failure_keeps_memory_state() {
    let store = DurableStore::new(FailingBackend);
    let mut cache = inactive(&store);

    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      1,
      ShipmentStatus::Pending,
    )])));
    cache.dispatch(Intent::patch(
      CollectionKind::Shipments,
      1,
      json!({"status": "accepted"}),
    ));

    assert_eq!(cache.shipments()[0].status, ShipmentStatus::Accepted);
  }

  #[tokio::test]
  async fn test_auto_refresh_issues_one_fetch() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let shipments_gate = shipments.gate();
    let users_gate = users.gate();

    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);
    assert!(cache.state().shipments.loading);
    assert_eq!(shipments.calls(), 1);

    // Settling again while the first fetch is pending must not fetch again
    cache.settle();
    cache.dispatch(Intent::filter(CollectionKind::Users, json!({"approved": true})));
    assert_eq!(shipments.calls(), 1);
    assert_eq!(users.calls(), 1);

    shipments_gate
      .send(Ok(vec![shipment(1, ShipmentStatus::Pending)]))
      .unwrap();
    users_gate.send(Ok(vec![User::new(2, UserRole::Driver)])).unwrap();
    cache.wait_idle().await;

    assert_eq!(cache.shipments().len(), 1);
    assert_eq!(cache.users().len(), 1);
    assert!(!cache.state().shipments.loading);

    cache.settle();
    assert_eq!(shipments.calls(), 1);
    assert_eq!(users.calls(), 1);
  }

  #[tokio::test]
  async fn test_empty_response_is_not_refetched_in_a_loop() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);

    cache.wait_idle().await;
    cache.settle();

    assert_eq!(shipments.calls(), 1);
    assert!(cache.shipments().is_empty());
    assert!(!cache.has_in_flight());
  }

  #[tokio::test]
  async fn test_failed_load_keeps_stale_data_until_refresh() {
    let shipments = FakeClient::<Shipment>::returning(Err("503 Service Unavailable".into()));
    let users = FakeClient::<User>::empty();
    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), false);
    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      9,
      ShipmentStatus::InTransit,
    )])));

    cache.refresh(CollectionKind::Shipments);
    cache.wait_idle().await;

    assert_eq!(cache.shipments().len(), 1);
    assert_eq!(
      cache.state().shipments.error.as_deref(),
      Some("503 Service Unavailable")
    );

    shipments.set_default(Ok(vec![shipment(10, ShipmentStatus::Pending)]));
    cache.refresh(CollectionKind::Shipments);
    cache.wait_idle().await;

    assert_eq!(cache.shipments()[0].id, 10);
    assert_eq!(cache.state().shipments.error, None);
  }

  #[tokio::test]
  async fn test_failing_endpoint_is_not_hammered() {
    let shipments = FakeClient::<Shipment>::returning(Err("connection refused".into()));
    let users = FakeClient::<User>::returning(Err("connection refused".into()));
    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);

    cache.wait_idle().await;
    cache.settle();
    assert_eq!(shipments.calls(), 1);

    // Changing the filter re-arms the auto-refresh condition
    cache.dispatch(Intent::filter(CollectionKind::Shipments, json!({"status": null})));
    assert_eq!(shipments.calls(), 2);
    assert_eq!(users.calls(), 1);
  }

  #[tokio::test]
  async fn test_superseded_response_is_dropped() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let slow = shipments.gate();
    let fast = shipments.gate();

    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);
    cache.refresh(CollectionKind::Shipments);
    assert_eq!(shipments.calls(), 2);

    fast.send(Ok(vec![shipment(2, ShipmentStatus::Delivered)])).unwrap();
    cache.wait_idle().await;
    assert_eq!(cache.shipments()[0].id, 2);

    slow.send(Ok(vec![shipment(1, ShipmentStatus::Pending)])).unwrap();
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    cache.poll();

    assert_eq!(cache.shipments(), &[shipment(2, ShipmentStatus::Delivered)]);
  }

  #[tokio::test]
  async fn test_response_after_logout_is_dropped() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let gate = shipments.gate();
    let store = DurableStore::in_memory();

    let mut cache = ApplicationCache::initialize(store.clone(), remotes(&shipments, &users), true);
    cache.logout();

    gate.send(Ok(vec![shipment(1, ShipmentStatus::Pending)])).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    cache.poll();

    assert!(cache.shipments().is_empty());
    assert!(!cache.state().shipments.loading);
    assert_eq!(store.read(SNAPSHOT_KEY), None);
  }

  #[tokio::test]
  async fn test_shipment_lifecycle_scenario() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let store = DurableStore::in_memory();
    let mut cache = ApplicationCache::initialize(store.clone(), remotes(&shipments, &users), false);

    cache.dispatch(Intent::BeginLoad(CollectionKind::Shipments));
    assert!(cache.state().shipments.loading);

    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      1,
      ShipmentStatus::Pending,
    )])));
    assert!(!cache.state().shipments.loading);
    assert_eq!(cache.shipments().len(), 1);

    cache.dispatch(Intent::patch(
      CollectionKind::Shipments,
      1,
      json!({"status": "accepted"}),
    ));
    assert_eq!(cache.shipments(), &[shipment(1, ShipmentStatus::Accepted)]);
    assert_eq!(
      stored_snapshot(&store).unwrap().shipments,
      vec![shipment(1, ShipmentStatus::Accepted)]
    );

    cache.dispatch(Intent::DeleteRecord(CollectionKind::Shipments, 1));
    assert!(cache.shipments().is_empty());
    assert!(stored_snapshot(&store).unwrap().shipments.is_empty());

    // Emptied collection is fetched again on the next settle
    cache.dispatch(Intent::CompleteLoad(Records::Users(vec![User::new(
      3,
      UserRole::Customer,
    )])));
    cache.set_active(true);
    assert_eq!(shipments.calls(), 1);
    assert_eq!(users.calls(), 0);
    assert!(cache.state().shipments.loading);
  }

  #[test]
  fn test_missing_runtime_records_error_instead_of_panicking() {
    let shipments = FakeClient::<Shipment>::empty();
    let users = FakeClient::<User>::empty();
    let cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);

    assert!(!cache.state().shipments.loading);
    assert!(cache.state().shipments.error.is_some());
    assert!(!cache.has_in_flight());
  }

  #[test]
  fn test_subscribers_see_each_transition() {
    let mut cache = inactive(&DurableStore::in_memory());
    let mut table = cache.subscribe();
    let mut detail = cache.subscribe();

    cache.dispatch(Intent::DeleteRecord(CollectionKind::Users, 42));
    let first = table.try_recv().unwrap();
    assert_eq!(first.collection, Some(CollectionKind::Users));
    assert_eq!(first.revision, cache.revision());

    cache.logout();
    assert_eq!(table.try_recv().unwrap().collection, None);
    // A subscriber that fell behind reads the latest revision only
    let caught_up = detail.try_recv().unwrap();
    assert_eq!(caught_up.revision, cache.revision());
    assert_eq!(detail.try_recv(), None);
  }

  #[tokio::test]
  async fn test_reactivation_refetches_collection_left_empty() {
    let shipments = FakeClient::<Shipment>::returning(Err("offline".into()));
    let users = FakeClient::<User>::empty();
    let mut cache =
      ApplicationCache::initialize(DurableStore::in_memory(), remotes(&shipments, &users), true);
    cache.wait_idle().await;
    assert_eq!(shipments.calls(), 1);

    // Staying active does not re-arm
    cache.set_active(true);
    assert_eq!(shipments.calls(), 1);

    cache.set_active(false);
    cache.set_active(true);
    assert_eq!(shipments.calls(), 2);
    assert_eq!(users.calls(), 2);
    assert!(cache.state().shipments.loading);
  }

  #[test]
  fn test_reset_intent_removes_snapshot() {
    let store = DurableStore::in_memory();
    let mut cache = inactive(&store);
    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      1,
      ShipmentStatus::Pending,
    )])));
    assert!(store.read(SNAPSHOT_KEY).is_some());

    cache.dispatch(Intent::Reset);
    assert!(cache.shipments().is_empty());
    assert_eq!(store.read(SNAPSHOT_KEY), None);

    let reloaded = inactive(&store);
    assert!(reloaded.shipments().is_empty());
  }

  #[test]
  fn test_visible_records_apply_filter() {
    let mut cache = inactive(&DurableStore::in_memory());
    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![
      shipment(1, ShipmentStatus::Pending),
      shipment(2, ShipmentStatus::Delivered),
      shipment(3, ShipmentStatus::Pending),
    ])));
    cache.dispatch(Intent::filter(
      CollectionKind::Shipments,
      json!({"status": "pending"}),
    ));

    let ids: Vec<_> = cache.visible_shipments().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(cache.shipments().len(), 3);
  }

  #[test]
  fn test_logout_clears_memory_and_snapshot() {
    let store = DurableStore::in_memory();
    let mut cache = inactive(&store);
    cache.dispatch(Intent::CompleteLoad(Records::Shipments(vec![shipment(
      1,
      ShipmentStatus::Pending,
    )])));
    cache.dispatch(Intent::CompleteLoad(Records::Users(vec![User::new(
      5,
      UserRole::Admin,
    )])));
    assert!(store.read(SNAPSHOT_KEY).is_some());

    cache.logout();

    assert!(cache.shipments().is_empty());
    assert!(cache.users().is_empty());
    assert_eq!(store.read(SNAPSHOT_KEY), None);
    assert!(!cache.is_active());
  }
}
