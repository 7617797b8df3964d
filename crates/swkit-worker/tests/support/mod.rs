#![allow(dead_code)]

//! Scripted network doubles for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http::StatusCode;
use swkit_net::{Fetcher, NetError, Request, Response};
use swkit_worker::{ServiceWorkerContext, WorkerConfig};
use url::Url;

/// A scripted network: fixed responses per URL, switchable offline mode,
/// call counting.
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, (StatusCode, String, String)>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    /// Script a 200 response.
    pub fn ok(&self, url: &str, content_type: &str, body: &str) {
        self.respond(url, StatusCode::OK, content_type, body);
    }

    /// Script an arbitrary response.
    pub fn respond(&self, url: &str, status: StatusCode, content_type: &str, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            (status, content_type.to_string(), body.to_string()),
        );
    }

    /// Make every subsequent fetch fail at the transport level.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetError::RequestFailed("network unreachable".to_string()));
        }
        let routes = self.routes.lock().unwrap();
        match routes.get(request.url.as_str()) {
            Some((status, content_type, body)) => {
                Ok(Response::new(*status, content_type, body.clone()))
            }
            None => Ok(Response::new(StatusCode::NOT_FOUND, "text/plain", "not found")),
        }
    }
}

/// A network that must not be touched; any fetch panics the test.
pub struct NoNetwork;

#[async_trait]
impl Fetcher for NoNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        panic!("network must not be touched for {}", request.url);
    }
}

pub const SCOPE: &str = "https://example.com/";

pub fn scope() -> Url {
    Url::parse(SCOPE).unwrap()
}

pub fn context(fetcher: Arc<dyn Fetcher>) -> ServiceWorkerContext {
    ServiceWorkerContext::new(WorkerConfig::new(scope(), "v1.0.0"), fetcher)
}
