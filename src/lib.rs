//! Data layer of the freight logistics admin console.
//!
//! The [`cache::ApplicationCache`] owns the canonical copy of shipments and
//! users, persists it through a [`store::DurableStore`], refreshes empty
//! collections from the platform API and is cleared by the
//! [`session::SessionGate`] on logout.

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod session;
pub mod store;
