//! Synthetic responses for when both network and cache have failed.
//!
//! Selection depends on the request's destination and class. Every branch
//! ends in a response built from static content, so fallback generation
//! itself cannot fail and no raw error ever reaches the user.

use http::{Method, StatusCode};
use swkit_cache::CacheKey;
use swkit_common::LogErrExt;
use swkit_net::{Destination, Request, Response};
use tracing::debug;

use crate::classify::RequestClass;
use crate::context::ServiceWorkerContext;

/// Placeholder served for images that cannot be loaded.
pub const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg width="100" height="100" xmlns="http://www.w3.org/2000/svg">"##,
    r##"<rect width="100" height="100" fill="#ccc"/>"##,
    r##"<text x="50" y="50" text-anchor="middle" dy=".3em" fill="#666">Image</text>"##,
    r##"</svg>"##
);

/// Error envelope served for API calls while offline.
pub const OFFLINE_API_JSON: &str = r#"{"error": "Offline - API unavailable"}"#;

/// Self-contained offline page served when no pre-cached document exists.
pub const OFFLINE_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Offline</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #F2F2F7;
            color: #000000;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
            padding: 20px;
        }
        .offline-container { text-align: center; max-width: 400px; }
        .offline-title { font-size: 24px; font-weight: 700; margin-bottom: 10px; color: #007AFF; }
        .offline-message { font-size: 16px; color: #8E8E93; margin-bottom: 20px; line-height: 1.5; }
        .retry-button {
            background: #007AFF;
            color: white;
            border: none;
            border-radius: 12px;
            padding: 12px 24px;
            font-size: 16px;
            font-weight: 600;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="offline-container">
        <h1 class="offline-title">You're Offline</h1>
        <p class="offline-message">
            It looks like you've lost your internet connection.
            Some features may not be available while offline.
        </p>
        <button class="retry-button" onclick="window.location.reload()">Try Again</button>
    </div>
</body>
</html>
"#;

/// Produce a synthetic response for a request both network and cache
/// failed to satisfy.
pub async fn fallback(
    request: &Request,
    class: RequestClass,
    ctx: &ServiceWorkerContext,
) -> Response {
    debug!(url = %request.url, class = class.as_str(), destination = request.destination.as_str(), "Generating fallback");

    if request.destination == Destination::Image {
        return Response::svg(PLACEHOLDER_SVG);
    }

    if class == RequestClass::ApiOrAdmin {
        return Response::json_body(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_API_JSON);
    }

    // Page navigation or unclassified asset: prefer the pre-cached offline
    // document, synthesize one if it was never cached.
    if let Some(key) = offline_document_key(ctx) {
        let storage = ctx.storage().read().await;
        if let Some(entry) = storage.match_any(&key) {
            if let Some(response) = entry.to_response().log_err("replay offline document") {
                return response;
            }
        }
    }

    Response::html(StatusCode::OK, OFFLINE_PAGE_HTML)
}

fn offline_document_key(ctx: &ServiceWorkerContext) -> Option<CacheKey> {
    let config = ctx.config();
    let url = config.scope.join(&config.offline_document).ok()?;
    Some(CacheKey::new(&Method::GET, &url))
}
