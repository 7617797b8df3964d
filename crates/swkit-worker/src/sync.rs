//! Background sync queue.
//!
//! The queue itself is a stub: there is no persisted backlog of offline
//! actions yet, so [`pending_actions`] always returns an empty list.
//! Processing is intentionally minimal: each action is fetched once and
//! a failure is logged, nothing more.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use swkit_net::Request;
use tracing::{info, warn};
use url::Url;

use crate::context::ServiceWorkerContext;

/// An action recorded while offline, to be replayed on sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Actions waiting to be replayed. Always empty: offline actions are not
/// persisted anywhere yet.
pub fn pending_actions() -> Vec<PendingAction> {
    Vec::new()
}

/// Replay pending actions. Returns the number replayed successfully.
pub async fn process_pending(ctx: &ServiceWorkerContext) -> usize {
    let actions = pending_actions();
    if actions.is_empty() {
        return 0;
    }

    let mut replayed = 0;
    for action in actions {
        if replay(ctx, &action).await {
            replayed += 1;
        }
    }
    info!(replayed, "Background sync completed");
    replayed
}

async fn replay(ctx: &ServiceWorkerContext, action: &PendingAction) -> bool {
    let Ok(url) = Url::parse(&action.url) else {
        warn!(url = action.url.as_str(), "Skipping action with invalid URL");
        return false;
    };
    let Ok(method) = Method::from_bytes(action.method.as_bytes()) else {
        warn!(method = action.method.as_str(), "Skipping action with invalid method");
        return false;
    };

    let mut request = Request::with_method(url, method, action.body.clone().map(Bytes::from));
    for (name, value) in &action.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            request.headers.insert(name, value);
        }
    }

    match ctx.fetcher().fetch(&request).await {
        Ok(response) if response.ok() => true,
        Ok(response) => {
            warn!(url = %request.url, status = %response.status, "Offline action rejected");
            false
        }
        Err(e) => {
            warn!(url = %request.url, error = %e, "Offline action failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_empty() {
        assert!(pending_actions().is_empty());
    }
}
