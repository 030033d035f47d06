//! Durable key/value persistence for the cache snapshot and credentials.
//!
//! Backends report failures through `Result`; [`DurableStore`] is the
//! boundary that turns those failures into log lines so persistence problems
//! never reach the cache's consumers.

mod memory;
mod sqlite;

use color_eyre::Result;
use std::sync::Arc;
use tracing::warn;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Trait for key/value storage backends.
pub trait KeyValueBackend: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>>;

  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Removing an absent key is not an error.
  fn delete(&self, key: &str) -> Result<()>;
}

/// Infallible facade over a backend.
#[derive(Clone)]
pub struct DurableStore {
  backend: Arc<dyn KeyValueBackend>,
}

impl DurableStore {
  pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
    Self {
      backend: Arc::new(backend),
    }
  }

  /// Volatile store, used when persistence is disabled and in tests.
  pub fn in_memory() -> Self {
    Self::new(MemoryBackend::default())
  }

  /// Read failures are reported as absence.
  pub fn read(&self, key: &str) -> Option<String> {
    match self.backend.get(key) {
      Ok(value) => value,
      Err(e) => {
        warn!(key, error = %e, "durable store read failed");
        None
      }
    }
  }

  /// Write failures are logged and swallowed.
  pub fn write(&self, key: &str, value: &str) {
    if let Err(e) = self.backend.set(key, value) {
      warn!(key, bytes = value.len(), error = %e, "durable store write failed");
    }
  }

  pub fn remove(&self, key: &str) {
    if let Err(e) = self.backend.delete(key) {
      warn!(key, error = %e, "durable store remove failed");
    }
  }
}

impl std::fmt::Debug for DurableStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DurableStore").finish_non_exhaustive()
  }
}
