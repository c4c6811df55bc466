//! # Validation Module
//!
//! Input validation for everything declared at startup: view ids, route
//! pattern segments and redirect targets.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Declaration (THIS MODULE)                                    │
//! │  ├── View id format                                                     │
//! │  ├── Pattern segment format                                             │
//! │  └── Redirect target format                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Table construction (route.rs / provider.rs)                  │
//! │  ├── Duplicate patterns                                                 │
//! │  ├── Wildcard fallback present                                          │
//! │  └── Redirect targets render for the viewer sent there                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Registry sealing (storefront-shell)                          │
//! │  └── Every routed view is registered                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_view_id, validate_redirect_path};
//!
//! assert!(validate_view_id("product-detail").is_ok());
//! assert!(validate_redirect_path("/login").is_ok());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted view id.
const MAX_VIEW_ID_LEN: usize = 64;

/// Longest accepted redirect target.
const MAX_PATH_LEN: usize = 2048;

/// Longest accepted user id at sign-in.
pub const MAX_USER_ID_LEN: usize = 128;

/// Highest accepted unit price ($1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a view id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Lowercase ASCII letters, digits and hyphens (kebab-case)
/// - Must not start or end with a hyphen
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_view_id;
///
/// assert!(validate_view_id("how-it-works").is_ok());
/// assert!(validate_view_id("").is_err());
/// assert!(validate_view_id("HowItWorks").is_err());
/// ```
pub fn validate_view_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "view id".to_string(),
        });
    }

    if id.len() > MAX_VIEW_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "view id".to_string(),
            max: MAX_VIEW_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "view id".to_string(),
            reason: "must contain only lowercase letters, digits, and hyphens".to_string(),
        });
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(ValidationError::InvalidFormat {
            field: "view id".to_string(),
            reason: "must not start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

/// Validates the name of a named segment (`:id` → `id`).
pub fn validate_segment_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "segment name".to_string(),
        });
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "segment name".to_string(),
            reason: "must contain only letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a literal path segment of a route pattern.
///
/// Only RFC 3986 unreserved characters are allowed in declared literals.
pub fn validate_literal_segment(segment: &str) -> ValidationResult<()> {
    if !segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "path segment".to_string(),
            reason: format!("'{}' contains reserved characters", segment),
        });
    }

    Ok(())
}

/// Validates a user id presented at sign-in.
///
/// Surrounding whitespace is ignored; callers should store the trimmed form.
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    let user_id = user_id.trim();

    if user_id.is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }

    if user_id.len() > MAX_USER_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "user_id".to_string(),
            max: MAX_USER_ID_LEN,
        });
    }

    if user_id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "user_id".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a unit price in cents.
///
/// ## Rules
/// - Cannot be negative (zero is a free item)
/// - At most `MAX_PRICE_CENTS`
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Path Validators
// =============================================================================

/// Validates a redirect target path.
///
/// ## Rules
/// - Must start with a single `/` (protocol-relative `//host` and `/\host`
///   are rejected)
/// - At most 2048 characters
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_redirect_path;
///
/// assert!(validate_redirect_path("/").is_ok());
/// assert!(validate_redirect_path("//evil.example").is_err());
/// assert!(validate_redirect_path("/\\evil.example").is_err());
/// assert!(validate_redirect_path("login").is_err());
/// ```
pub fn validate_redirect_path(path: &str) -> ValidationResult<()> {
    let path = path.trim();

    if path.is_empty() {
        return Err(ValidationError::Required {
            field: "redirect path".to_string(),
        });
    }

    if path.len() > MAX_PATH_LEN {
        return Err(ValidationError::TooLong {
            field: "redirect path".to_string(),
            max: MAX_PATH_LEN,
        });
    }

    // Browsers read `/\host` the same as `//host`.
    if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
        return Err(ValidationError::InvalidFormat {
            field: "redirect path".to_string(),
            reason: "must be an absolute path on this site".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_view_id() {
        assert!(validate_view_id("home").is_ok());
        assert!(validate_view_id("order-success").is_ok());
        assert!(validate_view_id("page2").is_ok());

        assert!(validate_view_id("").is_err());
        assert!(validate_view_id("Order").is_err());
        assert!(validate_view_id("order success").is_err());
        assert!(validate_view_id("-order").is_err());
        assert!(validate_view_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_segment_name() {
        assert!(validate_segment_name("id").is_ok());
        assert!(validate_segment_name("product_id").is_ok());
        assert!(validate_segment_name("").is_err());
        assert!(validate_segment_name("id-x").is_err());
    }

    #[test]
    fn test_validate_literal_segment() {
        assert!(validate_literal_segment("forgot-password").is_ok());
        assert!(validate_literal_segment("v1.2").is_ok());
        assert!(validate_literal_segment("a?b").is_err());
        assert!(validate_literal_segment("a b").is_err());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("ada").is_ok());
        assert!(validate_user_id("  ada  ").is_ok());
        assert!(validate_user_id("   ").is_err());
        assert!(validate_user_id("a\tb").is_err());
        assert!(validate_user_id(&"u".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_redirect_path() {
        assert!(validate_redirect_path("/login").is_ok());
        assert!(validate_redirect_path("").is_err());
        assert!(validate_redirect_path("login").is_err());
        assert!(validate_redirect_path("//evil.example/login").is_err());
        assert!(validate_redirect_path("/\\evil.example").is_err());
        assert!(validate_redirect_path("/search\\terms").is_ok());
        assert!(validate_redirect_path(&format!("/{}", "a".repeat(2048))).is_err());
    }
}
