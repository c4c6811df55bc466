//! # storefront-core: Pure Navigation Rules for the Storefront
//!
//! This crate decides, for every navigable path, which view loads and whether
//! the viewer may reach it. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/storefront (console)                       │   │
//! │  │        go /cart ──► login ada ──► retry 1 ──► reload            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-shell                             │   │
//! │  │   registry, deferred loader, scopes, containment, navigation    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   route   │  │  policy   │  │   guard   │  │ provider  │  │   │
//! │  │   │  table    │  │  decide   │  │ directive │  │  order    │  │   │
//! │  │   │  match    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO RENDERING • PURE FUNCTIONS                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Access classes, viewer state, decisions, view targets
//! - [`route`] - Path patterns and the route table
//! - [`policy`] - The access policy
//! - [`guard`] - Guard wrapper producing render directives
//! - [`provider`] - Provider scope nesting order
//! - [`storefront`] - The storefront's concrete routes
//! - [`validation`] - Identifier and path validation
//! - [`error`] - Configuration error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::guard::guard;
//! use storefront_core::route::RouteTable;
//! use storefront_core::{Redirect, RedirectTargets, RenderDirective, ViewerState};
//!
//! let table = RouteTable::storefront().unwrap();
//! let directive = guard(
//!     &table.match_path("/cart"),
//!     &ViewerState::anonymous(),
//!     &RedirectTargets::default(),
//! );
//!
//! assert_eq!(
//!     directive,
//!     RenderDirective::Redirect(Redirect::with_return("/login", "/cart"))
//! );
//! ```

pub mod error;
pub mod guard;
pub mod policy;
pub mod provider;
pub mod route;
pub mod storefront;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ConfigurationError, CoreResult, ValidationError};
pub use provider::{ProviderScope, ProviderStack};
pub use route::{RouteEntry, RouteMatch, RouteParams, RouteTable};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Where Private routes send anonymous viewers.
pub const SIGN_IN_PATH: &str = "/login";

/// Where AuthOnly routes send signed-in viewers.
pub const LANDING_PATH: &str = "/";

/// Query parameter carrying the return target on sign-in redirects.
pub const RETURN_PARAM: &str = "redirect";

/// Longest redirect chain the shell will follow for one navigation.
///
/// Validated redirect targets always render after one hop; the cap only
/// matters if the shell is handed a table that skipped validation.
pub const MAX_REDIRECTS: usize = 4;
