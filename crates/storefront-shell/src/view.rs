//! View module interface.
//!
//! Every page or section module exposes one renderable unit. The shell never
//! looks inside it: it hands over the route-extracted parameters and a
//! read-only snapshot of the scopes, and takes back [`Rendered`] output or a
//! [`RenderFault`].

use std::sync::Arc;

use serde::Serialize;
use storefront_core::{RouteParams, ViewId, ViewerState};

use crate::cart::CartTotals;
use crate::error::RenderFault;
use crate::theme::Theme;

/// Read-only inputs available to a view while rendering.
#[derive(Debug)]
pub struct ViewContext<'a> {
    pub view: &'a ViewId,
    /// Location being rendered (query string included).
    pub location: &'a str,
    pub params: &'a RouteParams,
    pub viewer: &'a ViewerState,
    pub theme: Theme,
    pub cart: &'a CartTotals,
}

/// Output of one view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub title: String,
    pub lines: Vec<String>,
}

impl Rendered {
    pub fn new(title: impl Into<String>) -> Self {
        Rendered {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

/// A loaded view module.
pub trait View: Send + Sync {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault>;
}

/// Shared handle to a loaded module, memoized by the loader.
pub type ViewHandle = Arc<dyn View>;
