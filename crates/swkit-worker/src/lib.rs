//! # SwKit Worker
//!
//! Offline-first service worker runtime: classifies intercepted requests,
//! applies a caching strategy per class, synthesizes fallbacks when both
//! network and cache fail, and manages the install/activate lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! WorkerEvent ──► ServiceWorkerContext::dispatch
//!     │
//!     ├── Install ──► precache manifest into the static store (all-or-nothing)
//!     ├── Activate ─► delete orphaned stores, claim clients
//!     ├── Fetch ────► classify ──► Strategy ──► CacheStorage / Fetcher
//!     │                                 └── on total failure: fallback
//!     ├── Message ──► SKIP_WAITING / CACHE_URLS
//!     └── Push ─────► Notification
//! ```
//!
//! ## Strategies
//!
//! - Static assets: cache-first with network fallback
//! - API calls and pages: network-first with cache fallback
//! - Non-GET requests bypass caching entirely

use thiserror::Error;

pub mod classify;
pub mod clients;
pub mod config;
pub mod context;
pub mod fallback;
pub mod lifecycle;
pub mod message;
pub mod push;
pub mod strategy;
pub mod sync;

pub use classify::{classify, RequestClass};
pub use clients::{Client, ClientRegistry};
pub use config::{RouteConfig, WorkerConfig};
pub use context::{EventOutcome, ServiceWorkerContext, WorkerEvent};
pub use fallback::fallback;
pub use lifecycle::WorkerState;
pub use message::ControlMessage;
pub use push::{build_notification, notification_click, Notification};
pub use strategy::Strategy;
pub use sync::{pending_actions, process_pending, PendingAction};

use swkit_net::NetError;

/// Errors surfaced by the worker.
///
/// Fetch handling never produces these for GET requests: every transport
/// failure on that path converges on a fallback response instead.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Install is atomic: the first manifest URL that fails to fetch, or
    /// fetches with a non-success status, aborts the whole install.
    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// Transport failure for a pass-through (non-GET) request.
    #[error(transparent)]
    Net(#[from] NetError),
}
