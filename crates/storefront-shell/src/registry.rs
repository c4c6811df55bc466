//! # View Registry
//!
//! Maps a view id to a deferred-loadable reference. Nothing is fetched at
//! registration; the loader runs on first navigation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup                                         runtime                │
//! │  ───────                                         ───────                │
//! │  ViewRegistryBuilder::register(id, loader) ──┐                          │
//! │  ViewRegistryBuilder::register(id, loader) ──┼─► seal() ──► ViewRegistry│
//! │  duplicate id ──► ConfigurationError (fatal) │              resolve(id) │
//! │                                              │              (read only) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sealed registry is immutable configuration. There is no way to add or
//! replace a view after startup.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use storefront_core::validation::validate_view_id;
use storefront_core::{ConfigurationError, CoreResult, RouteTable, ViewId};
use tracing::debug;

use crate::error::LoadFailure;
use crate::view::ViewHandle;

/// Future produced by a view loader.
pub type LoadFuture = BoxFuture<'static, Result<ViewHandle, LoadFailure>>;

/// A view loader: called once per fetch attempt.
pub type LoaderFn = Arc<dyn Fn() -> LoadFuture + Send + Sync>;

// =============================================================================
// View Reference
// =============================================================================

/// An identifier plus the loader that fetches it.
#[derive(Clone)]
pub struct ViewReference {
    id: ViewId,
    loader: LoaderFn,
}

impl ViewReference {
    #[inline]
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Starts one fetch attempt.
    pub(crate) fn fetch(&self) -> LoadFuture {
        (self.loader)()
    }
}

impl fmt::Debug for ViewReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewReference").field("id", &self.id).finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Startup-only registration surface.
#[derive(Default)]
pub struct ViewRegistryBuilder {
    views: HashMap<ViewId, ViewReference>,
}

impl ViewRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loader for `id`.
    ///
    /// ## Errors
    /// - `DuplicateView` if `id` is already registered
    /// - `Validation` if `id` is not a kebab-case identifier
    pub fn register<F, Fut>(&mut self, id: &str, loader: F) -> CoreResult<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewHandle, LoadFailure>> + Send + 'static,
    {
        validate_view_id(id)?;

        let id = ViewId::new(id);
        if self.views.contains_key(&id) {
            return Err(ConfigurationError::DuplicateView { id: id.to_string() });
        }

        let loader: LoaderFn = Arc::new(move || -> LoadFuture { Box::pin(loader()) });
        debug!(view = %id, "View registered");
        self.views.insert(id.clone(), ViewReference { id, loader });
        Ok(())
    }

    /// Freezes the registry.
    pub fn seal(self) -> ViewRegistry {
        ViewRegistry { views: self.views }
    }
}

// =============================================================================
// Sealed Registry
// =============================================================================

/// Immutable view registry.
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    views: HashMap<ViewId, ViewReference>,
}

impl ViewRegistry {
    pub fn builder() -> ViewRegistryBuilder {
        ViewRegistryBuilder::new()
    }

    /// Returns the reference registered for `id`.
    pub fn resolve(&self, id: &ViewId) -> CoreResult<ViewReference> {
        self.views
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownView { id: id.to_string() })
    }

    /// Checks that every view the route table can render is registered.
    pub fn verify(&self, table: &RouteTable) -> CoreResult<()> {
        for id in table.views() {
            self.resolve(id)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
