//! Controlled client pages.

use std::sync::atomic::{AtomicU64, Ordering};

use std::collections::HashMap;

use tracing::debug;
use url::Url;

/// An open page within the worker's scope.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client ID.
    pub id: String,
    /// Page URL.
    pub url: Url,
    /// Whether this worker version controls the page.
    pub controlled: bool,
}

impl Client {
    /// Create an uncontrolled client for a page.
    pub fn new(url: Url) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self {
            id: format!("client-{}", COUNTER.fetch_add(1, Ordering::Relaxed)),
            url,
            controlled: false,
        }
    }
}

/// Registry of open pages the worker may claim.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client; returns its ID.
    pub fn add(&mut self, client: Client) -> String {
        let id = client.id.clone();
        self.clients.insert(id.clone(), client);
        id
    }

    /// Get a client by ID.
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Remove a client (page closed).
    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    /// Take control of every registered page, so this version starts
    /// intercepting their requests without a reload.
    pub fn claim(&mut self) {
        for client in self.clients.values_mut() {
            client.controlled = true;
        }
        debug!(count = self.clients.len(), "Claimed clients");
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Number of clients controlled by this version.
    pub fn controlled_count(&self) -> usize {
        self.clients.values().filter(|c| c.controlled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ids_unique() {
        let url = Url::parse("https://example.com/").unwrap();
        let a = Client::new(url.clone());
        let b = Client::new(url);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_claim_controls_all() {
        let mut registry = ClientRegistry::new();
        let url = Url::parse("https://example.com/about/").unwrap();
        registry.add(Client::new(url.clone()));
        registry.add(Client::new(url));

        assert_eq!(registry.controlled_count(), 0);
        registry.claim();
        assert_eq!(registry.controlled_count(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = ClientRegistry::new();
        let url = Url::parse("https://example.com/").unwrap();
        let id = registry.add(Client::new(url));
        assert!(registry.get(&id).is_some());
        assert!(registry.remove(&id).is_some());
        assert!(registry.is_empty());
    }
}
