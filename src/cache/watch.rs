//! Change notifications for views reading from the cache.

use tokio::sync::watch;
use tracing::trace;

use super::state::CollectionKind;

/// Published to subscribers after an intent has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheChange {
  /// Monotonic counter of applied intents
  pub revision: u64,
  /// Collection that changed, `None` when both did (reset)
  pub collection: Option<CollectionKind>,
}

impl CacheChange {
  pub fn affects(&self, kind: CollectionKind) -> bool {
    self.collection.map_or(true, |c| c == kind)
  }
}

/// Receiving half held by a view.
///
/// Only the most recent change is kept. A view that falls behind sees the
/// latest revision on its next read and skips the ones in between.
#[derive(Debug)]
pub struct Subscription {
  receiver: watch::Receiver<CacheChange>,
}

impl Subscription {
  /// Wait for the next change. `None` once the cache is dropped.
  pub async fn recv(&mut self) -> Option<CacheChange> {
    self.receiver.changed().await.ok()?;
    Some(*self.receiver.borrow_and_update())
  }

  /// Latest change not yet seen by this subscription, if any.
  pub fn try_recv(&mut self) -> Option<CacheChange> {
    match self.receiver.has_changed() {
      Ok(true) => Some(*self.receiver.borrow_and_update()),
      _ => None,
    }
  }
}

/// Publishing side owned by the cache.
#[derive(Debug)]
pub struct Watchers {
  sender: watch::Sender<CacheChange>,
}

impl Default for Watchers {
  fn default() -> Self {
    let (sender, _) = watch::channel(CacheChange {
      revision: 0,
      collection: None,
    });
    Self { sender }
  }
}

impl Watchers {
  pub fn subscribe(&self) -> Subscription {
    Subscription {
      receiver: self.sender.subscribe(),
    }
  }

  /// Replace the published change. Never blocks and never queues.
  pub fn notify(&self, change: CacheChange) {
    self.sender.send_replace(change);
    trace!(
      revision = change.revision,
      subscribers = self.sender.receiver_count(),
      "cache change"
    );
  }

  pub fn subscriber_count(&self) -> usize {
    self.sender.receiver_count()
  }
}
