//! Scriptable remote clients for cache tests.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::traits::{FetchOutcome, Remotes, ResourceClient};
use crate::api::types::{Shipment, User};

struct Script<T> {
  calls: AtomicUsize,
  default: Mutex<FetchOutcome<T>>,
  gates: Mutex<VecDeque<oneshot::Receiver<FetchOutcome<T>>>>,
}

/// Answers immediately with a fixed outcome, unless a gate was queued with
/// [`FakeClient::gate`], in which case the next call waits for the test to
/// release it.
pub struct FakeClient<T> {
  script: Arc<Script<T>>,
}

impl<T> Clone for FakeClient<T> {
  fn clone(&self) -> Self {
    Self {
      script: Arc::clone(&self.script),
    }
  }
}

impl<T: Clone + Send + 'static> FakeClient<T> {
  pub fn returning(outcome: FetchOutcome<T>) -> Self {
    Self {
      script: Arc::new(Script {
        calls: AtomicUsize::new(0),
        default: Mutex::new(outcome),
        gates: Mutex::new(VecDeque::new()),
      }),
    }
  }

  pub fn empty() -> Self {
    Self::returning(Ok(Vec::new()))
  }

  /// Make the next call block until the returned sender is used.
  pub fn gate(&self) -> oneshot::Sender<FetchOutcome<T>> {
    let (tx, rx) = oneshot::channel();
    self.script.gates.lock().unwrap().push_back(rx);
    tx
  }

  pub fn set_default(&self, outcome: FetchOutcome<T>) {
    *self.script.default.lock().unwrap() = outcome;
  }

  pub fn calls(&self) -> usize {
    self.script.calls.load(Ordering::SeqCst)
  }
}

impl<T, F> ResourceClient<T, F> for FakeClient<T>
where
  T: Clone + Send + Sync + 'static,
{
  fn fetch_all(&self, _filter: &F) -> BoxFuture<'static, FetchOutcome<T>> {
    self.script.calls.fetch_add(1, Ordering::SeqCst);

    if let Some(gate) = self.script.gates.lock().unwrap().pop_front() {
      return async move {
        gate
          .await
          .unwrap_or_else(|_| Err("gate dropped".to_string()))
      }
      .boxed();
    }

    let outcome = self.script.default.lock().unwrap().clone();
    async move { outcome }.boxed()
  }
}

pub fn remotes(shipments: &FakeClient<Shipment>, users: &FakeClient<User>) -> Remotes {
  Remotes::new(Arc::new(shipments.clone()), Arc::new(users.clone()))
}
