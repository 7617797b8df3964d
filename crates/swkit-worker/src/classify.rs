//! Request classification.
//!
//! Pure and synchronous: a class is a function of the URL's path prefix
//! and hostname only. Rules are evaluated in order, first match wins,
//! and every URL maps to exactly one class.

use url::Url;

use crate::config::RouteConfig;

/// What kind of traffic a request is, for strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Immutable file under a static prefix, or from an allowed asset host.
    StaticAsset,
    /// API or administrative call.
    ApiOrAdmin,
    /// Everything else: navigable pages.
    Page,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::StaticAsset => "static",
            RequestClass::ApiOrAdmin => "api",
            RequestClass::Page => "page",
        }
    }
}

/// Classify a URL.
pub fn classify(url: &Url, routes: &RouteConfig) -> RequestClass {
    let path = url.path();

    let asset_host = url
        .host_str()
        .is_some_and(|host| routes.asset_hosts.iter().any(|h| h == host));
    if asset_host || routes.static_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return RequestClass::StaticAsset;
    }

    if routes.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
        return RequestClass::ApiOrAdmin;
    }

    RequestClass::Page
}
