//! # SwKit Common
//!
//! Logging configuration and shared utilities for the SwKit offline worker
//! runtime.
//!
//! ## Features
//!
//! - Logging configuration and setup
//! - Tolerated-error helper for best-effort operations

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};

/// Extension trait for results whose failure is tolerated.
///
/// Several operations in the worker must never abort the surrounding work:
/// a failed cache write still returns the response to the caller, and a
/// failed orphan-store deletion skips to the next store. This converts such
/// a result into an `Option`, logging the error at WARN.
pub trait LogErrExt<T> {
    /// Log the error with the given context and discard it.
    fn log_err(self, context: &'static str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogErrExt<T> for Result<T, E> {
    fn log_err(self, context: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(context, error = %e, "operation failed, continuing");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_err_ok_passes_value() {
        let result: Result<u32, String> = Ok(7);
        assert_eq!(result.log_err("test"), Some(7));
    }

    #[test]
    fn test_log_err_swallows_error() {
        let result: Result<u32, String> = Err("boom".to_string());
        assert_eq!(result.log_err("test"), None);
    }
}
