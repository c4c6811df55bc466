//! # Provider Composition
//!
//! Mounts the global scopes in the order declared by a [`ProviderStack`].
//!
//! ```text
//! ┌─ Containment ─────────────────────────────────────────────────────────┐
//! │ ┌─ Theme ───────────────────────────────────────────────────────────┐ │
//! │ │ ┌─ Authentication ──────────────────────────────────────────────┐ │ │
//! │ │ │ ┌─ Cart (reads Authentication) ─────────────────────────────┐ │ │ │
//! │ │ │ │ ┌─ Routing ─────────────────────────────────────────────┐ │ │ │ │
//! │ │ │ │ │  guard → load → render                                │ │ │ │ │
//! │ │ │ │ └───────────────────────────────────────────────────────┘ │ │ │ │
//! │ │ │ └───────────────────────────────────────────────────────────┘ │ │ │
//! │ │ └───────────────────────────────────────────────────────────────┘ │ │
//! │ └───────────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every scope is mounted fresh; nothing survives a reload.

use storefront_core::{ProviderScope, ProviderStack};
use tracing::debug;

use crate::cart::CartScope;
use crate::config::StorefrontConfig;
use crate::containment::FailureBoundary;
use crate::error::{ShellError, ShellResult};
use crate::session::SessionStore;
use crate::theme::ThemeScope;

/// The mounted scopes.
#[derive(Debug, Clone)]
pub struct Providers {
    stack: ProviderStack,
    boundary: FailureBoundary,
    theme: ThemeScope,
    session: SessionStore,
    cart: CartScope,
}

impl Providers {
    /// Initializes each scope outer → inner.
    ///
    /// ## Errors
    /// `ScopeInit` if a scope is mounted before a scope it reads from.
    pub fn mount(stack: &ProviderStack, config: &StorefrontConfig) -> ShellResult<Self> {
        let mut boundary = None;
        let mut theme = None;
        let mut session: Option<SessionStore> = None;
        let mut cart = None;
        let mut routing = false;

        for scope in stack.outer_to_inner() {
            debug!(%scope, "Mounting provider scope");
            match scope {
                ProviderScope::Containment => boundary = Some(FailureBoundary),
                ProviderScope::Theme => theme = Some(ThemeScope::new(config.theme.default)),
                ProviderScope::Authentication => session = Some(SessionStore::new()),
                ProviderScope::Cart => {
                    let session = session.as_ref().ok_or_else(|| ShellError::ScopeInit {
                        scope,
                        reason: "authentication scope is not mounted".into(),
                    })?;
                    cart = Some(CartScope::mount(session.clone()));
                }
                ProviderScope::Routing => routing = true,
            }
        }

        let missing = |scope: ProviderScope| ShellError::ScopeInit {
            scope,
            reason: "scope was not declared".into(),
        };

        if !routing {
            return Err(missing(ProviderScope::Routing));
        }

        Ok(Providers {
            stack: stack.clone(),
            boundary: boundary.ok_or_else(|| missing(ProviderScope::Containment))?,
            theme: theme.ok_or_else(|| missing(ProviderScope::Theme))?,
            session: session.ok_or_else(|| missing(ProviderScope::Authentication))?,
            cart: cart.ok_or_else(|| missing(ProviderScope::Cart))?,
        })
    }

    pub fn stack(&self) -> &ProviderStack {
        &self.stack
    }

    pub fn boundary(&self) -> &FailureBoundary {
        &self.boundary
    }

    pub fn theme(&self) -> &ThemeScope {
        &self.theme
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cart(&self) -> &CartScope {
        &self.cart
    }
}
