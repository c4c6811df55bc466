//! # Shell Error Types
//!
//! ## Failure Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Failure             Boundary that handles it     Viewer sees           │
//! │  ───────             ────────────────────────     ───────────           │
//! │  ConfigurationError  startup (fatal)              process exits         │
//! │  LoadFailure         the region that asked        retryable placeholder │
//! │  access denial       guard (not an error)         redirect              │
//! │  RenderFault         FailureBoundary              recovery + reload     │
//! │  ShellError          startup / reload             process exits /       │
//! │                                                   recovery view         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are contained at the narrowest boundary that can recover.

use storefront_core::{ConfigurationError, ProviderScope, ValidationError};
use thiserror::Error;

/// Result type alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

// =============================================================================
// Load Failure
// =============================================================================

/// A view module could not be fetched.
///
/// Regional and retryable: the next `load` of the same view starts a new
/// fetch. `Clone` so the loader can keep it in its lifecycle slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The loader itself reported an error.
    #[error("View '{view}' failed to load: {reason}")]
    Fetch { view: String, reason: String },

    /// The loader did not finish in time.
    #[error("View '{view}' did not load within {timeout_ms} ms")]
    TimedOut { view: String, timeout_ms: u64 },

    /// The fetch task stopped (panicked) before producing a result.
    #[error("View '{view}' loader stopped before completing")]
    Aborted { view: String },
}

impl LoadFailure {
    pub fn fetch(view: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadFailure::Fetch {
            view: view.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Render Fault
// =============================================================================

/// An uncaught fault while producing output. Only the failure boundary
/// handles these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderFault {
    pub message: String,
}

impl RenderFault {
    pub fn new(message: impl Into<String>) -> Self {
        RenderFault {
            message: message.into(),
        }
    }
}

// =============================================================================
// Shell Error
// =============================================================================

/// Startup and lifecycle errors.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Route/view/provider declarations are invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Config values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A provider scope could not be initialized.
    #[error("Provider scope {scope} failed to initialize: {reason}")]
    ScopeInit { scope: ProviderScope, reason: String },

    /// Sign-in input was rejected.
    #[error("Sign-in rejected: {0}")]
    SignIn(#[from] ValidationError),
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ShellError {
    fn from(err: toml::de::Error) -> Self {
        ShellError::ConfigLoadFailed(err.to_string())
    }
}

impl ShellError {
    /// Returns true if this error comes from configuration (file or declarations).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ShellError::Configuration(_)
                | ShellError::ConfigLoadFailed(_)
                | ShellError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_display() {
        let err = LoadFailure::fetch("testimonials", "chunk missing");
        assert_eq!(
            err.to_string(),
            "View 'testimonials' failed to load: chunk missing"
        );

        let err = LoadFailure::TimedOut {
            view: "cart".into(),
            timeout_ms: 250,
        };
        assert_eq!(err.to_string(), "View 'cart' did not load within 250 ms");
    }

    #[test]
    fn test_config_error_classification() {
        let err: ShellError = ConfigurationError::MissingFallback.into();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("wildcard"));

        let err = ShellError::ScopeInit {
            scope: ProviderScope::Cart,
            reason: "no session".into(),
        };
        assert!(!err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Provider scope cart failed to initialize: no session"
        );
    }
}
