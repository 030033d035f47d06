//! Authentication presence and session teardown.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::info;

use crate::cache::ApplicationCache;
use crate::store::DurableStore;

/// Durable-store key holding the API token.
pub const CREDENTIALS_KEY: &str = "freightdesk.auth.v1";

/// Where the API token lives between runs.
pub trait CredentialStore: Send + Sync {
  fn token(&self) -> Option<String>;

  fn store(&self, token: &str);

  fn clear(&self);
}

/// Token kept in the same durable store as the cache snapshot.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
  store: DurableStore,
}

impl StoredCredentials {
  pub fn new(store: DurableStore) -> Self {
    Self { store }
  }
}

impl CredentialStore for StoredCredentials {
  fn token(&self) -> Option<String> {
    self
      .store
      .read(CREDENTIALS_KEY)
      .filter(|token| !token.is_empty())
  }

  fn store(&self, token: &str) {
    self.store.write(CREDENTIALS_KEY, token);
  }

  fn clear(&self) {
    self.store.remove(CREDENTIALS_KEY);
  }
}

/// Ties the cache's "active" flag to the presence of credentials and clears
/// cached data when a session ends.
#[derive(Clone)]
pub struct SessionGate {
  credentials: Arc<dyn CredentialStore>,
}

impl SessionGate {
  pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
    Self { credentials }
  }

  pub fn credentials(&self) -> Arc<dyn CredentialStore> {
    Arc::clone(&self.credentials)
  }

  pub fn is_authenticated(&self) -> bool {
    self.credentials.token().is_some()
  }

  /// Align the cache with the current authentication state (used at startup).
  pub fn sync(&self, cache: &mut ApplicationCache) {
    cache.set_active(self.is_authenticated());
  }

  /// Start a session. Logging in with a different token first ends the
  /// previous session so its cached records are not shown to the new user.
  pub fn login(&self, token: &str, cache: &mut ApplicationCache) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
      return Err(eyre!("API token must not be empty"));
    }

    if let Some(previous) = self.credentials.token() {
      if previous != token {
        self.logout(cache);
      }
    }

    self.credentials.store(token);
    cache.set_active(true);
    info!("session started");
    Ok(())
  }

  /// End the session: credentials first, then the persisted snapshot and the
  /// in-memory state. Both are gone before this returns.
  pub fn logout(&self, cache: &mut ApplicationCache) {
    self.credentials.clear();
    cache.logout();
    info!("session ended");
  }
}
