//! Caching strategies.
//!
//! The strategy-to-class binding is a fixed table with no hidden state:
//! static assets are cache-first, API calls and pages are network-first.
//! Both strategies treat only transport failures as failures; a response
//! with an HTTP error status is passed through (and never cached).

use swkit_cache::CacheKey;
use swkit_common::LogErrExt;
use swkit_net::{NetError, Request, Response};
use tracing::{debug, trace, warn};

use crate::classify::{classify, RequestClass};
use crate::context::ServiceWorkerContext;
use crate::fallback::fallback;

/// Caching strategy for a request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Serve from the static store; fetch and populate on miss.
    CacheFirst,
    /// Fetch; fall back to any cached copy, then to a synthetic response.
    NetworkFirst,
}

impl Strategy {
    /// The fixed binding table.
    pub fn for_class(class: RequestClass) -> Self {
        match class {
            RequestClass::StaticAsset => Strategy::CacheFirst,
            RequestClass::ApiOrAdmin | RequestClass::Page => Strategy::NetworkFirst,
        }
    }
}

/// Route a request through its strategy.
///
/// Only called for GET requests; always yields a response.
pub(crate) async fn route(ctx: &ServiceWorkerContext, request: &Request) -> Response {
    let class = classify(&request.url, &ctx.config().routes);
    let strategy = Strategy::for_class(class);
    trace!(url = %request.url, class = class.as_str(), ?strategy, "Routing request");

    match strategy {
        Strategy::CacheFirst => cache_first(ctx, request, class).await,
        Strategy::NetworkFirst => network_first(ctx, request, class).await,
    }
}

/// Cache-first with network fallback.
async fn cache_first(
    ctx: &ServiceWorkerContext,
    request: &Request,
    class: RequestClass,
) -> Response {
    let key = CacheKey::for_request(request);

    {
        let storage = ctx.storage().read().await;
        let cached = storage
            .get(&ctx.stores().static_store)
            .and_then(|store| store.match_key(&key));
        if let Some(entry) = cached {
            // No staleness check: static entries live until the store is
            // replaced on a version bump.
            if let Some(response) = entry.to_response().log_err("replay static entry") {
                debug!(key = %key, "Static store hit");
                return response;
            }
        }
    }

    match ctx.fetcher().fetch(request).await {
        Ok(response) => {
            if response.ok() {
                // Store before returning, so an early-cancelling caller
                // still leaves the cache populated.
                let mut storage = ctx.storage().write().await;
                storage
                    .open(&ctx.stores().static_store)
                    .put_response(request, &response);
            }
            response
        }
        Err(e) => {
            warn!(url = %request.url, error = %e, "Static fetch failed, falling back");
            fallback(request, class, ctx).await
        }
    }
}

/// Network-first with cache fallback.
async fn network_first(
    ctx: &ServiceWorkerContext,
    request: &Request,
    class: RequestClass,
) -> Response {
    let error: NetError = match ctx.fetcher().fetch(request).await {
        Ok(response) => {
            if response.ok() {
                let mut storage = ctx.storage().write().await;
                storage
                    .open(&ctx.stores().dynamic_store)
                    .put_response(request, &response);
            }
            // Error statuses pass through uncached.
            return response;
        }
        Err(e) => e,
    };

    warn!(url = %request.url, error = %error, "Network fetch failed, trying cache");

    let key = CacheKey::for_request(request);
    {
        let storage = ctx.storage().read().await;
        // Any store qualifies here, not just the dynamic one.
        if let Some(entry) = storage.match_any(&key) {
            if let Some(response) = entry.to_response().log_err("replay cached entry") {
                debug!(key = %key, "Cache fallback hit");
                return response;
            }
        }
    }

    fallback(request, class, ctx).await
}
