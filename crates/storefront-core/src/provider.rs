//! # Provider Stack Ordering
//!
//! Global-state scopes wrap the routed content in a fixed nesting order. The
//! order is data: a list consumed by one composition function, not structure
//! scattered across the shell.
//!
//! ## Nesting Order (outer → inner)
//! ```text
//! ┌─ Containment ─────────────────────────────────────────────┐
//! │  ┌─ Theme ─────────────────────────────────────────────┐  │
//! │  │  ┌─ Authentication ─────────────────────────────┐   │  │
//! │  │  │  ┌─ Cart ─────────────────────────────────┐  │   │  │
//! │  │  │  │  ┌─ Routing ────────────────────────┐  │  │   │  │
//! │  │  │  │  │  matched view                    │  │  │   │  │
//! │  │  │  │  └──────────────────────────────────┘  │  │   │  │
//! │  │  │  └────────────────────────────────────────┘  │   │  │
//! │  │  └──────────────────────────────────────────────┘   │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! - Containment is outermost so it sees faults from every scope, including
//!   scope initialization itself.
//! - Cart attributes carts to the signed-in viewer, so it sits inside
//!   Authentication.
//! - Theme has no dependents among the state scopes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, CoreResult};

/// One nesting level of global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderScope {
    Containment,
    Theme,
    Authentication,
    Cart,
    Routing,
}

impl ProviderScope {
    /// Scopes that must enclose this one.
    pub fn depends_on(&self) -> &'static [ProviderScope] {
        match self {
            ProviderScope::Containment => &[],
            ProviderScope::Theme => &[ProviderScope::Containment],
            ProviderScope::Authentication => &[ProviderScope::Containment],
            ProviderScope::Cart => &[ProviderScope::Containment, ProviderScope::Authentication],
            ProviderScope::Routing => &[
                ProviderScope::Containment,
                ProviderScope::Theme,
                ProviderScope::Authentication,
                ProviderScope::Cart,
            ],
        }
    }
}

impl fmt::Display for ProviderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderScope::Containment => write!(f, "containment"),
            ProviderScope::Theme => write!(f, "theme"),
            ProviderScope::Authentication => write!(f, "authentication"),
            ProviderScope::Cart => write!(f, "cart"),
            ProviderScope::Routing => write!(f, "routing"),
        }
    }
}

/// The fixed outer → inner order.
pub const NESTING_ORDER: [ProviderScope; 5] = [
    ProviderScope::Containment,
    ProviderScope::Theme,
    ProviderScope::Authentication,
    ProviderScope::Cart,
    ProviderScope::Routing,
];

/// A validated provider nesting, outer → inner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStack {
    scopes: Vec<ProviderScope>,
}

impl ProviderStack {
    /// Validates a declared nesting.
    ///
    /// ## Errors
    /// - `DuplicateScope` if a scope appears twice
    /// - `ScopeOutOfOrder` if a scope is not at its fixed position
    /// - `MissingScope` if a scope is absent
    pub fn compose(scopes: &[ProviderScope]) -> CoreResult<Self> {
        for (position, scope) in scopes.iter().enumerate() {
            if scopes[..position].contains(scope) {
                return Err(ConfigurationError::DuplicateScope { scope: *scope });
            }

            let expected = NESTING_ORDER
                .iter()
                .position(|s| s == scope)
                .unwrap_or(position);
            if expected != position {
                return Err(ConfigurationError::ScopeOutOfOrder {
                    scope: *scope,
                    position,
                    expected,
                });
            }
        }

        if let Some(missing) = NESTING_ORDER.iter().find(|s| !scopes.contains(s)) {
            return Err(ConfigurationError::MissingScope { scope: *missing });
        }

        Ok(ProviderStack {
            scopes: scopes.to_vec(),
        })
    }

    /// The canonical stack.
    pub fn canonical() -> Self {
        ProviderStack {
            scopes: NESTING_ORDER.to_vec(),
        }
    }

    pub fn outer_to_inner(&self) -> impl Iterator<Item = ProviderScope> + '_ {
        self.scopes.iter().copied()
    }

    /// Teardown order.
    pub fn inner_to_outer(&self) -> impl Iterator<Item = ProviderScope> + '_ {
        self.scopes.iter().rev().copied()
    }

    /// True if `outer` wraps `inner`.
    pub fn encloses(&self, outer: ProviderScope, inner: ProviderScope) -> bool {
        let depth = |scope| self.scopes.iter().position(|s| *s == scope);
        matches!((depth(outer), depth(inner)), (Some(o), Some(i)) if o < i)
    }
}

impl Default for ProviderStack {
    fn default() -> Self {
        ProviderStack::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_composes() {
        let stack = ProviderStack::compose(&NESTING_ORDER).unwrap();
        assert_eq!(stack, ProviderStack::canonical());
        assert_eq!(stack.outer_to_inner().next(), Some(ProviderScope::Containment));
        assert_eq!(stack.inner_to_outer().next(), Some(ProviderScope::Routing));
    }

    #[test]
    fn test_dependencies_enclose_dependents() {
        let stack = ProviderStack::canonical();
        for scope in NESTING_ORDER {
            for dependency in scope.depends_on() {
                assert!(
                    stack.encloses(*dependency, scope),
                    "{} must enclose {}",
                    dependency,
                    scope
                );
            }
        }
        assert!(!stack.encloses(ProviderScope::Cart, ProviderScope::Authentication));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let err = ProviderStack::compose(&[
            ProviderScope::Containment,
            ProviderScope::Theme,
            ProviderScope::Cart,
            ProviderScope::Authentication,
            ProviderScope::Routing,
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ScopeOutOfOrder {
                scope: ProviderScope::Cart,
                position: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn test_missing_and_duplicate_rejected() {
        let err = ProviderStack::compose(&[
            ProviderScope::Containment,
            ProviderScope::Theme,
            ProviderScope::Authentication,
            ProviderScope::Cart,
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingScope {
                scope: ProviderScope::Routing
            }
        ));

        let err = ProviderStack::compose(&[
            ProviderScope::Containment,
            ProviderScope::Containment,
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateScope { .. }));
    }
}
