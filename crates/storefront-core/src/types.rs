//! # Domain Types
//!
//! Core types shared by the route table, the access policy and the shell.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  AccessClass    │   │   ViewerState   │   │ AccessDecision  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Public         │   │  authenticated  │   │  allow          │       │
//! │  │  AuthOnly       │   │  identity?      │   │  redirect_to?   │       │
//! │  │  Private        │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    ViewId       │   │   ViewTarget    │   │ RenderDirective │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  "cart"         │   │  Page(id)       │   │  RenderView     │       │
//! │  │  "product-..."  │   │  Sections(ids)  │   │  Redirect       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Access Class
// =============================================================================

/// Who may render a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AccessClass {
    /// Anyone.
    Public,
    /// Only viewers who are NOT signed in (sign-in, registration, recovery).
    AuthOnly,
    /// Only signed-in viewers.
    Private,
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessClass::Public => write!(f, "public"),
            AccessClass::AuthOnly => write!(f, "auth_only"),
            AccessClass::Private => write!(f, "private"),
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// Identifier of a deferred-loadable view module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ViewId(String);

impl ViewId {
    /// Creates a view id. Format is checked when the view is registered.
    pub fn new(id: impl Into<String>) -> Self {
        ViewId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        ViewId::new(id)
    }
}

/// What a route renders.
///
/// ## Placeholders
/// - `Page`: one deferred view; a whole-page placeholder while pending
/// - `Sections`: independently deferred regions, each with its own smaller
///   placeholder; siblings resolve without waiting for each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ViewTarget {
    Page(ViewId),
    Sections(Vec<ViewId>),
}

impl ViewTarget {
    /// Every view this target needs, in region order.
    pub fn views(&self) -> &[ViewId] {
        match self {
            ViewTarget::Page(id) => std::slice::from_ref(id),
            ViewTarget::Sections(ids) => ids,
        }
    }

    #[inline]
    pub fn is_sectioned(&self) -> bool {
        matches!(self, ViewTarget::Sections(_))
    }
}

// =============================================================================
// Viewer Session State
// =============================================================================

/// The signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
    /// Session identifier (UUID v4), new on every sign-in.
    pub session_id: String,
    #[ts(as = "String")]
    pub signed_in_at: DateTime<Utc>,
}

/// What the access policy knows about the viewer.
///
/// ## Invariant
/// `is_authenticated()` is true exactly when an identity is present. The
/// fields are private so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    is_authenticated: bool,
    identity: Option<Identity>,
}

impl ViewerState {
    /// A viewer who is not signed in.
    pub fn anonymous() -> Self {
        ViewerState::default()
    }

    /// A signed-in viewer.
    pub fn signed_in(identity: Identity) -> Self {
        ViewerState {
            is_authenticated: true,
            identity: Some(identity),
        }
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    #[inline]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// A redirect issued instead of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    /// Where the viewer is sent.
    pub to: String,
    /// The originally requested path, carried so sign-in can return there.
    pub return_to: Option<String>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Redirect {
            to: path.into(),
            return_to: None,
        }
    }

    pub fn with_return(path: impl Into<String>, return_to: impl Into<String>) -> Self {
        Redirect {
            to: path.into(),
            return_to: Some(return_to.into()),
        }
    }

    /// The concrete location to navigate to.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::Redirect;
    ///
    /// let redirect = Redirect::with_return("/login", "/cart");
    /// assert_eq!(redirect.location("redirect"), "/login?redirect=%2Fcart");
    /// ```
    pub fn location(&self, return_param: &str) -> String {
        match &self.return_to {
            Some(target) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
                format!("{}?{}={}", self.to, return_param, encoded)
            }
            None => self.to.clone(),
        }
    }
}

/// Result of the access policy for one navigation.
///
/// Recomputed on every navigation and every session change; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub allow: bool,
    pub redirect_to: Option<Redirect>,
}

impl AccessDecision {
    pub fn allow() -> Self {
        AccessDecision {
            allow: true,
            redirect_to: None,
        }
    }

    pub fn redirect(redirect: Redirect) -> Self {
        AccessDecision {
            allow: false,
            redirect_to: Some(redirect),
        }
    }
}

/// What the guard tells the shell to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RenderDirective {
    RenderView(ViewTarget),
    Redirect(Redirect),
}

/// The two global redirect targets.
///
/// Fixed for the whole table (never per route); configuration may move them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RedirectTargets {
    /// Where Private routes send anonymous viewers.
    pub sign_in: String,
    /// Where AuthOnly routes send signed-in viewers.
    pub landing: String,
}

impl Default for RedirectTargets {
    fn default() -> Self {
        RedirectTargets {
            sign_in: crate::SIGN_IN_PATH.to_string(),
            landing: crate::LANDING_PATH.to_string(),
        }
    }
}
