//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── ConfigurationError - Bad route/view/provider declarations         │
//! │  └── ValidationError    - Malformed identifiers and paths              │
//! │                                                                         │
//! │  storefront-shell errors (separate crate)                              │
//! │  ├── LoadFailure        - A view module failed to load (regional)      │
//! │  ├── RenderFault        - A view failed while rendering (boundary)     │
//! │  └── ShellError         - Startup / config file failures               │
//! │                                                                         │
//! │  NOT an error: access denial is an AccessDecision (redirect)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Configuration errors are fatal at startup and must never be swallowed
//! 2. Include the offending pattern / id in every message
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::provider::ProviderScope;

// =============================================================================
// Configuration Error
// =============================================================================

/// Startup configuration errors.
///
/// Raised while building the route table, the view registry or the provider
/// stack. None of these can occur once the shell is running.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Two route entries normalize to the same pattern.
    ///
    /// ## When This Occurs
    /// - `/cart` and `/cart/` declared separately
    /// - `/product/:id` and `/product/:sku` (segment names are not significant)
    #[error("Duplicate route pattern: {pattern}")]
    DuplicateRoute { pattern: String },

    /// A view id was registered twice.
    #[error("View '{id}' is already registered")]
    DuplicateView { id: String },

    /// A route references a view that was never registered.
    #[error("View '{id}' is not registered")]
    UnknownView { id: String },

    /// A route pattern could not be parsed.
    #[error("Malformed route pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// The table has no wildcard entry, so some paths would be unmatched.
    #[error("Route table has no wildcard fallback entry")]
    MissingFallback,

    /// A redirect target would not render for the viewer sent to it.
    #[error("Invalid redirect target '{path}': {reason}")]
    InvalidRedirectTarget { path: String, reason: String },

    /// A provider scope required by the nesting order is absent.
    #[error("Provider scope {scope} is missing from the stack")]
    MissingScope { scope: ProviderScope },

    /// A provider scope was declared more than once.
    #[error("Provider scope {scope} is declared more than once")]
    DuplicateScope { scope: ProviderScope },

    /// A provider scope sits at the wrong nesting level.
    #[error("Provider scope {scope} is at position {position}, expected {expected}")]
    ScopeOutOfOrder {
        scope: ProviderScope,
        position: usize,
        expected: usize,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for identifiers and paths.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., uppercase view id, path without leading slash).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ConfigurationError.
pub type CoreResult<T> = Result<T, ConfigurationError>;
