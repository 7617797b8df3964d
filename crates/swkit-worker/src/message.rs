//! Inbound control messages.

use serde::{Deserialize, Serialize};

/// A control message from the page, discriminated by its `type` field.
///
/// Anything that does not parse into one of these variants is ignored by
/// the handler; an unknown message must never crash the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Force this version to become the activation candidate immediately.
    SkipWaiting,
    /// Fetch-and-store the given URLs into the static store.
    CacheUrls { urls: Vec<String> },
}

impl ControlMessage {
    /// Parse a raw message, returning `None` for malformed or unknown input.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_skip_waiting() {
        let value = json!({"type": "SKIP_WAITING"});
        assert_eq!(ControlMessage::parse(&value), Some(ControlMessage::SkipWaiting));
    }

    #[test]
    fn test_parse_cache_urls() {
        let value = json!({"type": "CACHE_URLS", "urls": ["/a.css", "/b.js"]});
        assert_eq!(
            ControlMessage::parse(&value),
            Some(ControlMessage::CacheUrls {
                urls: vec!["/a.css".to_string(), "/b.js".to_string()]
            })
        );
    }

    #[test]
    fn test_unknown_type_is_none() {
        let value = json!({"type": "SELF_DESTRUCT"});
        assert_eq!(ControlMessage::parse(&value), None);
    }

    #[test]
    fn test_missing_payload_is_none() {
        // CACHE_URLS without its urls field.
        let value = json!({"type": "CACHE_URLS"});
        assert_eq!(ControlMessage::parse(&value), None);
    }

    #[test]
    fn test_non_object_is_none() {
        assert_eq!(ControlMessage::parse(&serde_json::json!(42)), None);
        assert_eq!(ControlMessage::parse(&serde_json::json!("SKIP_WAITING")), None);
    }
}
