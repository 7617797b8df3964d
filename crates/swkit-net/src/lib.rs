//! # SwKit Net
//!
//! HTTP request/response model and network fetching for the SwKit offline
//! worker runtime.
//!
//! ## Design Goals
//!
//! 1. **One vocabulary**: `Request`/`Response` types shared by the router,
//!    the cache layer, and the fallback generator
//! 2. **Pluggable transport**: the [`Fetcher`] trait is the only seam the
//!    router touches, so tests can script the network
//! 3. **Transport errors are errors, HTTP errors are responses**: a 4xx/5xx
//!    comes back as a successful fetch carrying a non-success status

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use mime::Mime;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

/// Errors that can occur while fetching.
///
/// Every variant is a transport-level failure. An HTTP error status never
/// maps here; callers inspect [`Response::ok`] for that.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Unique identifier for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// What kind of resource a request is for.
///
/// Mirrors the fetch destination of the originating element; the fallback
/// generator keys its placeholder selection on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Top-level or frame navigation.
    Document,
    Image,
    Script,
    Style,
    Font,
    /// Anything else (XHR/fetch, media, unknown).
    #[default]
    Other,
}

impl Destination {
    /// String form as the platform reports it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Image => "image",
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Font => "font",
            Destination::Other => "",
        }
    }
}

/// An intercepted HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub destination: Destination,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            id: RequestId::new(),
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
            destination: Destination::Other,
            body: None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Create a request with an explicit method and body.
    pub fn with_method(url: Url, method: Method, body: Option<Bytes>) -> Self {
        Self {
            id: RequestId::new(),
            url,
            method,
            headers: HeaderMap::new(),
            destination: Destination::Other,
            body,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Set the destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Add a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Whether this request is eligible for caching.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}

/// An HTTP response, either fetched from the network, replayed from a
/// cache store, or synthesized by the fallback generator.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Build a response with the given status, content type, and body.
    pub fn new(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(content_type) {
            headers.insert(http::header::CONTENT_TYPE, value);
        }
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Synthesize an HTML response. Never fails.
    pub fn html(status: StatusCode, body: &'static str) -> Self {
        Self::new(status, "text/html; charset=utf-8", Bytes::from_static(body.as_bytes()))
    }

    /// Synthesize a JSON response from a static body. Never fails.
    pub fn json_body(status: StatusCode, body: &'static str) -> Self {
        Self::new(status, "application/json", Bytes::from_static(body.as_bytes()))
    }

    /// Synthesize an SVG image response. Never fails.
    pub fn svg(body: &'static str) -> Self {
        Self::new(StatusCode::OK, "image/svg+xml", Bytes::from_static(body.as_bytes()))
    }

    /// Check if the status indicates success (2xx).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Parsed Content-Type header, if any.
    pub fn content_type(&self) -> Option<Mime> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Mime>().ok())
    }

    /// The body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body as text.
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| NetError::RequestFailed(e.to_string()))
    }

    /// The body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|e| NetError::RequestFailed(e.to_string()))
    }
}

/// The transport seam.
///
/// The strategy router only ever talks to the network through this trait;
/// [`HttpFetcher`] is the production implementation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a request from the network.
    ///
    /// An `Err` means the transport failed (unreachable, DNS, timeout);
    /// a response with an error status is an `Ok`.
    async fn fetch(&self, request: &Request) -> Result<Response, NetError>;
}

/// Fetcher configuration.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// User agent string.
    pub user_agent: String,
    /// Default timeout for requests without one.
    pub default_timeout: Duration,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// Enable the cookie store.
    pub cookies_enabled: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "SwKit/1.0".to_string(),
            default_timeout: Duration::from_secs(30),
            max_redirects: 10,
            cookies_enabled: true,
        }
    }
}

/// Network fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher.
    pub fn new(config: FetcherConfig) -> Result<Self, NetError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.default_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .cookie_store(config.cookies_enabled)
            .build()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?;

        debug!("HttpFetcher initialized");

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetError> {
        trace!(url = %request.url, method = %request.method, "Fetching resource");

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        trace!(
            url = %request.url,
            status = %status,
            body_len = body.len(),
            "Response received"
        );

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
