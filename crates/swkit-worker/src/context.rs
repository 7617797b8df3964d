//! The worker context and event dispatch.
//!
//! One context instance exists per worker version. It owns the store
//! handles, the version identifier, and the transport, and every event
//! handler receives it explicitly; there is no global worker state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use swkit_cache::{CacheStorage, StoreNames};
use swkit_net::{Fetcher, NetError, Request, Response};
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::clients::ClientRegistry;
use crate::config::WorkerConfig;
use crate::lifecycle::WorkerState;
use crate::message::ControlMessage;
use crate::push::{build_notification, Notification};
use crate::strategy;
use crate::WorkerError;

/// An event delivered to the worker.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Install this version: precache the manifest.
    Install,
    /// Activate this version: clean up stores, claim clients.
    Activate,
    /// An intercepted request.
    Fetch(Request),
    /// An inbound control message, as raw JSON.
    Message(serde_json::Value),
    /// A push payload (text, if any).
    Push(Option<String>),
}

/// What handling an event produced.
#[derive(Debug)]
pub enum EventOutcome {
    /// Nothing to hand back.
    None,
    /// The response for an intercepted request.
    Response(Response),
    /// A notification to display.
    Notification(Notification),
}

/// Process-wide context for one worker version.
pub struct ServiceWorkerContext {
    config: WorkerConfig,
    stores: StoreNames,
    storage: Arc<RwLock<CacheStorage>>,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    clients: RwLock<ClientRegistry>,
}

impl ServiceWorkerContext {
    /// Create a context with fresh storage.
    pub fn new(config: WorkerConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_storage(config, fetcher, Arc::new(RwLock::new(CacheStorage::new())))
    }

    /// Create a context sharing storage with other versions.
    ///
    /// Successive versions of the worker see the same underlying stores;
    /// this is how activation of a new version finds its predecessor's
    /// stores to delete.
    pub fn with_storage(
        config: WorkerConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<RwLock<CacheStorage>>,
    ) -> Self {
        let stores = config.store_names();
        Self {
            config,
            stores,
            storage,
            fetcher,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients: RwLock::new(ClientRegistry::new()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn stores(&self) -> &StoreNames {
        &self.stores
    }

    pub fn storage(&self) -> &Arc<RwLock<CacheStorage>> {
        &self.storage
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn clients(&self) -> &RwLock<ClientRegistry> {
        &self.clients
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        let mut current = self.state.write().await;
        trace!(from = current.as_str(), to = state.as_str(), "State transition");
        *current = state;
    }

    /// Whether this version asked to skip the waiting period.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Relaxed)
    }

    /// Dispatch one event.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, WorkerError> {
        match event {
            WorkerEvent::Install => self.install().await.map(|_| EventOutcome::None),
            WorkerEvent::Activate => {
                self.activate().await;
                Ok(EventOutcome::None)
            }
            WorkerEvent::Fetch(request) => self
                .handle_fetch(request)
                .await
                .map(EventOutcome::Response)
                .map_err(WorkerError::Net),
            WorkerEvent::Message(value) => {
                self.handle_message(value).await;
                Ok(EventOutcome::None)
            }
            WorkerEvent::Push(payload) => Ok(EventOutcome::Notification(build_notification(
                payload.as_deref(),
            ))),
        }
    }

    /// Handle an intercepted request.
    ///
    /// Non-GET requests are forwarded to the network untouched: no store
    /// lookup, no store write, transport errors propagated to the caller.
    /// GET requests are routed by class and always produce a response.
    pub async fn handle_fetch(&self, request: Request) -> Result<Response, NetError> {
        if !request.is_get() {
            trace!(url = %request.url, method = %request.method, "Non-GET pass-through");
            return self.fetcher.fetch(&request).await;
        }
        Ok(strategy::route(self, &request).await)
    }

    /// Install this version.
    ///
    /// Fetches the whole manifest before writing anything, so a failed
    /// install leaves the static store untouched. Any single failure
    /// (transport or non-success status) aborts the install and marks the
    /// version redundant.
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.set_state(WorkerState::Installing).await;
        info!(
            version = %self.config.version,
            urls = self.config.precache.len(),
            "Installing"
        );

        let mut fetched = Vec::with_capacity(self.config.precache.len());
        for raw in &self.config.precache {
            match self.precache_one(raw).await {
                Ok(pair) => fetched.push(pair),
                Err(e) => {
                    self.set_state(WorkerState::Redundant).await;
                    return Err(e);
                }
            }
        }

        {
            let mut storage = self.storage.write().await;
            let store = storage.open(&self.stores.static_store);
            for (request, response) in &fetched {
                store.put_response(request, response);
            }
        }

        // Signal readiness to activate without waiting for old clients.
        self.skip_waiting.store(true, Ordering::Relaxed);
        self.set_state(WorkerState::Installed).await;
        info!(version = %self.config.version, "Install complete");
        Ok(())
    }

    async fn precache_one(&self, raw: &str) -> Result<(Request, Response), WorkerError> {
        let url = self
            .resolve(raw)
            .map_err(|e| WorkerError::InstallFailed(format!("{raw}: {e}")))?;
        let request = Request::get(url);
        match self.fetcher.fetch(&request).await {
            Ok(response) if response.ok() => Ok((request, response)),
            Ok(response) => Err(WorkerError::InstallFailed(format!(
                "{} returned {}",
                request.url, response.status
            ))),
            Err(e) => Err(WorkerError::InstallFailed(format!("{}: {e}", request.url))),
        }
    }

    /// Activate this version.
    ///
    /// Deletes every store outside the retained set and claims all open
    /// clients. Never fails: an individual deletion failure is logged and
    /// the cleanup moves on.
    pub async fn activate(&self) {
        self.set_state(WorkerState::Activating).await;

        {
            let mut storage = self.storage.write().await;
            for name in storage.names() {
                if self.stores.is_retained(&name) {
                    continue;
                }
                if storage.delete(&name) {
                    debug!(store = %name, "Deleted orphaned store");
                } else {
                    warn!(store = %name, "Failed to delete orphaned store, skipping");
                }
            }
            // The retained stores exist from here on.
            for name in self.stores.retained() {
                storage.open(name);
            }
        }

        self.clients.write().await.claim();
        self.set_state(WorkerState::Active).await;
        info!(version = %self.config.version, "Activated");
    }

    /// Mark this version as superseded by a newer one.
    pub async fn supersede(&self) {
        self.set_state(WorkerState::Redundant).await;
        info!(version = %self.config.version, "Superseded");
    }

    /// Handle an inbound control message.
    ///
    /// Malformed or unknown messages are ignored; this never errors.
    pub async fn handle_message(&self, value: serde_json::Value) {
        let Some(message) = ControlMessage::parse(&value) else {
            debug!(%value, "Ignoring malformed control message");
            return;
        };
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting.store(true, Ordering::Relaxed);
                // Force activation if this version is sitting installed.
                if self.state().await == WorkerState::Installed {
                    self.activate().await;
                }
            }
            ControlMessage::CacheUrls { urls } => self.cache_urls(&urls).await,
        }
    }

    /// Fetch-and-store a list of URLs into the static store, best-effort.
    ///
    /// Unlike install, individual failures are logged and skipped.
    pub async fn cache_urls(&self, urls: &[String]) {
        for raw in urls {
            let url = match self.resolve(raw) {
                Ok(url) => url,
                Err(e) => {
                    warn!(url = raw.as_str(), error = %e, "Skipping invalid URL");
                    continue;
                }
            };
            let request = Request::get(url);
            match self.fetcher.fetch(&request).await {
                Ok(response) if response.ok() => {
                    let mut storage = self.storage.write().await;
                    storage
                        .open(&self.stores.static_store)
                        .put_response(&request, &response);
                    debug!(url = %request.url, "Pre-warmed");
                }
                Ok(response) => {
                    warn!(url = %request.url, status = %response.status, "Skipping non-success response");
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Failed to pre-warm URL");
                }
            }
        }
    }

    /// Resolve a manifest or message URL against the worker scope.
    fn resolve(&self, raw: &str) -> Result<Url, url::ParseError> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw)
        } else {
            self.config.scope.join(raw)
        }
    }
}
