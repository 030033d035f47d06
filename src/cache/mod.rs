//! Client-side application cache for shipments and users.
//!
//! This module provides:
//! - A single in-memory copy of both collections with per-collection
//!   loading/error/filter state
//! - Reducer-style mutation intents applied by one transition function
//! - Hydration from, and persistence to, a durable key/value store
//! - Lazy network refresh of empty collections
//! - Change notifications for every mounted view

mod layer;
mod merge;
mod snapshot;
mod state;
mod traits;
mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use layer::ApplicationCache;
pub use snapshot::{PersistedSnapshot, SNAPSHOT_KEY};
pub use state::{reduce, CacheState, CollectionKind, Entry, Intent, Records, Slot};
pub use traits::{Cacheable, FetchOutcome, Remotes, ResourceClient};
pub use watch::{CacheChange, Subscription};
