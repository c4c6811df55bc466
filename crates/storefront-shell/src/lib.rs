//! # storefront-shell: Runtime Composition for the Storefront
//!
//! This crate mounts the global scopes, fetches view modules on demand and
//! drives navigation against the pure rules in `storefront-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       storefront-shell                                  │
//! │                                                                         │
//! │   ┌───────────────┐   ┌────────────────┐   ┌───────────────────────┐   │
//! │   │ ViewRegistry  │──►│ DeferredLoader │──►│ Shell                 │   │
//! │   │ sealed at     │   │ single flight  │   │ navigate / pump       │   │
//! │   │ startup       │   │ per view       │   │ tickets, re-guarding  │   │
//! │   └───────────────┘   └────────────────┘   └───────────┬───────────┘   │
//! │                                                        │               │
//! │   ┌────────────────────────────────────────────────────▼───────────┐   │
//! │   │ Providers: Containment ► Theme ► Authentication ► Cart ►       │   │
//! │   │            Routing                                             │   │
//! │   └────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │   Failures: LoadFailure (regional, retryable) │ RenderFault (recovery) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! ### Loading
//! - [`view`] - The view module interface
//! - [`registry`] - Write-once view registry
//! - [`loader`] - Deferred loader with pending/ready/failed lifecycle
//! - [`catalog`] - The storefront's view modules
//!
//! ### Scopes
//! - [`containment`] - Failure boundary and recovery view
//! - [`theme`] - Light/dark preference
//! - [`session`] - Authentication state with change notification
//! - [`cart`] - In-memory cart
//! - [`providers`] - Mounting the scopes in their fixed order
//!
//! ### Shell
//! - [`shell`] - Navigation, event application, reload
//! - [`notify`] - Notification surface
//! - [`config`] - Configuration loading
//! - [`error`] - Shell error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use storefront_core::RouteTable;
//! use storefront_shell::{catalog, Shell, StorefrontConfig, TracingNotifier};
//!
//! let config = StorefrontConfig::load(None)?;
//! let registry = catalog::storefront_registry(Duration::from_millis(150), &[])?;
//! let table = RouteTable::storefront()?;
//! let mut shell = Shell::new(table, registry, config, Arc::new(TracingNotifier))?;
//!
//! shell.navigate("/cart");          // anonymous → /login?redirect=%2Fcart
//! shell.sign_in("ada", None)?;      // back to /cart
//! shell.settle().await;
//! println!("{}", shell.screen());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod containment;
pub mod error;
pub mod loader;
pub mod notify;
pub mod providers;
pub mod registry;
pub mod session;
pub mod shell;
pub mod theme;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{Cart, CartError, CartScope, CartTotals};
pub use config::StorefrontConfig;
pub use containment::{FailureBoundary, RecoveryAction, RecoveryView};
pub use error::{LoadFailure, RenderFault, ShellError, ShellResult};
pub use loader::{DeferredLoader, LoadResult, Placeholder};
pub use notify::{MemoryNotifier, Notification, NotificationConfig, Notifier, TracingNotifier};
pub use providers::Providers;
pub use registry::{ViewReference, ViewRegistry, ViewRegistryBuilder};
pub use session::SessionStore;
pub use shell::{NavTicket, Region, RegionState, RouteScreen, Screen, Shell};
pub use theme::{Theme, ThemeScope};
pub use view::{Rendered, View, ViewContext, ViewHandle};
