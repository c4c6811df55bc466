//! # Guard Wrapper
//!
//! Applies the access policy to a matched route and turns the decision into
//! a render directive.
//!
//! ## When The Guard Runs
//! ```text
//! navigate("/cart") ──────────────┐
//!                                  ├──► guard(match, viewer) ──► RenderView(target)
//! session changed while on /cart ─┘                         └──► Redirect(to)
//! ```
//!
//! The shell calls this on every navigation AND on every session change while
//! a route is active, so signing out on a Private page redirects at once.
//! Redirect targets are checked at startup by
//! [`RouteTable::validate_redirects`](crate::route::RouteTable::validate_redirects),
//! which is what keeps redirects from looping.

use crate::policy::decide;
use crate::route::RouteMatch;
use crate::types::{RedirectTargets, RenderDirective, ViewerState};

/// Decides what to render for `route` given the current viewer.
pub fn guard(
    route: &RouteMatch<'_>,
    viewer: &ViewerState,
    targets: &RedirectTargets,
) -> RenderDirective {
    let decision = decide(route.entry.access(), viewer, &route.requested, targets);

    match decision.redirect_to {
        Some(redirect) if !decision.allow => RenderDirective::Redirect(redirect),
        _ => RenderDirective::RenderView(route.entry.target().clone()),
    }
}
