//! Worker lifecycle states.
//!
//! ```text
//! Parsed → Installing → Installed → Activating → Active
//!              │                                    │
//!              └──────────► Redundant ◄─────────────┘ (superseded)
//! ```
//!
//! An install failure makes the version `Redundant` without ever activating,
//! leaving the previously active version in control.

use serde::{Deserialize, Serialize};

/// State of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkerState {
    /// Created, install not started.
    #[default]
    Parsed,
    /// Install in progress (precaching the manifest).
    Installing,
    /// Installed, candidate for activation.
    Installed,
    /// Activation in progress (store cleanup, client claim).
    Activating,
    /// Active and intercepting requests. Terminal in normal operation.
    Active,
    /// Superseded by a newer version, or install failed.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        }
    }

    /// Whether this version is intercepting requests.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerState::Active)
    }

    /// Whether this version is out of the rollout for good.
    pub fn is_redundant(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        assert_eq!(WorkerState::default(), WorkerState::Parsed);
    }

    #[test]
    fn test_predicates() {
        assert!(WorkerState::Active.is_active());
        assert!(!WorkerState::Installed.is_active());
        assert!(WorkerState::Redundant.is_redundant());
        assert!(!WorkerState::Active.is_redundant());
    }

    #[test]
    fn test_as_str() {
        assert_eq!(WorkerState::Activating.as_str(), "activating");
        assert_eq!(WorkerState::Redundant.as_str(), "redundant");
    }
}
