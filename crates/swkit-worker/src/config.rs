//! Worker configuration.

use swkit_cache::StoreNames;
use url::Url;

/// Classification rules for intercepted requests.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Path prefixes served as immutable static assets.
    pub static_prefixes: Vec<String>,
    /// Third-party hosts whose responses are treated as static assets
    /// (font CDNs).
    pub asset_hosts: Vec<String>,
    /// Path prefixes for API and administrative calls.
    pub api_prefixes: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            static_prefixes: vec!["/static/".to_string(), "/media/".to_string()],
            asset_hosts: vec![
                "fonts.googleapis.com".to_string(),
                "fonts.gstatic.com".to_string(),
            ],
            api_prefixes: vec!["/api/".to_string(), "/admin/".to_string()],
        }
    }
}

/// Configuration for one worker version.
///
/// The version string is the only cache-invalidation mechanism: it is
/// threaded into the store names, and bumping it makes the previous
/// version's stores orphans at the next activation.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Scope the worker controls; relative precache URLs resolve against it.
    pub scope: Url,
    /// Version identifier (e.g., "v1.0.0").
    pub version: String,
    /// Prefix for store names.
    pub cache_prefix: String,
    /// Manifest of URLs cached at install time, in order.
    pub precache: Vec<String>,
    /// Path of the pre-cached offline document used as a page fallback.
    pub offline_document: String,
    /// Classification rules.
    pub routes: RouteConfig,
}

impl WorkerConfig {
    /// Create a configuration with default routes and an empty manifest.
    pub fn new(scope: Url, version: impl Into<String>) -> Self {
        Self {
            scope,
            version: version.into(),
            cache_prefix: "swkit".to_string(),
            precache: Vec::new(),
            offline_document: "/offline.html".to_string(),
            routes: RouteConfig::default(),
        }
    }

    /// Set the install manifest.
    pub fn with_precache<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the store-name prefix.
    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the classification rules.
    pub fn with_routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    /// Store names for this version.
    pub fn store_names(&self) -> StoreNames {
        StoreNames::for_version(&self.cache_prefix, &self.version)
    }
}
