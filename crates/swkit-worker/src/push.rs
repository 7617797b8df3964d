//! Push notifications.
//!
//! Peripheral to the caching core: a push payload becomes a notification
//! with fixed icon and badge paths and two actions, and clicking `explore`
//! opens the site root.

use serde::{Deserialize, Serialize};
use url::Url;

/// Default body when a push carries no payload.
const DEFAULT_BODY: &str = "New notification";

/// An action button on a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}

/// Build the notification for a push payload.
pub fn build_notification(payload: Option<&str>) -> Notification {
    Notification {
        title: "Pixel Portfolio".to_string(),
        body: payload.unwrap_or(DEFAULT_BODY).to_string(),
        icon: "/static/icons/icon-192x192.png".to_string(),
        badge: "/static/icons/badge-72x72.png".to_string(),
        vibrate: vec![100, 50, 100],
        actions: vec![
            NotificationAction {
                action: "explore".to_string(),
                title: "Explore".to_string(),
                icon: "/static/icons/checkmark.png".to_string(),
            },
            NotificationAction {
                action: "close".to_string(),
                title: "Close".to_string(),
                icon: "/static/icons/xmark.png".to_string(),
            },
        ],
    }
}

/// URL to open when a notification action is clicked, if any.
pub fn notification_click(action: &str, scope: &Url) -> Option<Url> {
    match action {
        "explore" => Some(scope.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_uses_payload() {
        let notification = build_notification(Some("Achievement unlocked!"));
        assert_eq!(notification.body, "Achievement unlocked!");
    }

    #[test]
    fn test_notification_default_body() {
        let notification = build_notification(None);
        assert_eq!(notification.body, DEFAULT_BODY);
    }

    #[test]
    fn test_notification_actions() {
        let notification = build_notification(None);
        let actions: Vec<&str> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, ["explore", "close"]);
    }

    #[test]
    fn test_explore_opens_site_root() {
        let scope = Url::parse("https://example.com/").unwrap();
        assert_eq!(notification_click("explore", &scope), Some(scope.clone()));
        assert_eq!(notification_click("close", &scope), None);
        assert_eq!(notification_click("unknown", &scope), None);
    }
}
