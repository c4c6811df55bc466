//! # Access Policy
//!
//! Pure decision function: given a route's access class and the viewer's
//! session state, allow rendering or redirect.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Access class   Viewer          Decision                                │
//! │  ────────────   ──────          ────────                                │
//! │  Public         anyone          allow                                   │
//! │  AuthOnly       anonymous       allow                                   │
//! │  AuthOnly       signed in       redirect → landing                      │
//! │  Private        signed in       allow                                   │
//! │  Private        anonymous       redirect → sign-in (+ requested path)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No side effects and no I/O: the same inputs always give the same decision.

use crate::types::{AccessClass, AccessDecision, Redirect, RedirectTargets, ViewerState};
use crate::validation::validate_redirect_path;

/// Decides whether `viewer` may render a route of class `access`.
///
/// `requested_path` is the full path the viewer asked for (including any query
/// string); it is carried on sign-in redirects so a successful sign-in can
/// return there.
///
/// ## Example
/// ```rust
/// use storefront_core::policy::decide;
/// use storefront_core::{AccessClass, RedirectTargets, ViewerState};
///
/// let decision = decide(
///     AccessClass::Private,
///     &ViewerState::anonymous(),
///     "/cart",
///     &RedirectTargets::default(),
/// );
/// assert!(!decision.allow);
/// assert_eq!(decision.redirect_to.unwrap().return_to.as_deref(), Some("/cart"));
/// ```
pub fn decide(
    access: AccessClass,
    viewer: &ViewerState,
    requested_path: &str,
    targets: &RedirectTargets,
) -> AccessDecision {
    match access {
        AccessClass::Public => AccessDecision::allow(),
        AccessClass::AuthOnly if viewer.is_authenticated() => {
            AccessDecision::redirect(Redirect::to(targets.landing.as_str()))
        }
        AccessClass::AuthOnly => AccessDecision::allow(),
        AccessClass::Private if viewer.is_authenticated() => AccessDecision::allow(),
        AccessClass::Private => AccessDecision::redirect(Redirect::with_return(
            targets.sign_in.as_str(),
            requested_path,
        )),
    }
}

/// Extracts the return target carried in a sign-in location's query string.
///
/// Returns `None` when the parameter is absent or is not a same-site absolute
/// path, so a crafted link cannot bounce the viewer off-site after sign-in.
pub fn return_target(location: &str, return_param: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == return_param)
        .map(|(_, value)| value.into_owned())
        .filter(|target| validate_redirect_path(target).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identity;
    use chrono::Utc;

    fn signed_in() -> ViewerState {
        ViewerState::signed_in(Identity {
            user_id: "u-1".to_string(),
            display_name: "Ada".to_string(),
            session_id: "s-1".to_string(),
            signed_in_at: Utc::now(),
        })
    }

    fn viewers() -> Vec<ViewerState> {
        vec![ViewerState::anonymous(), signed_in()]
    }

    const CLASSES: [AccessClass; 3] = [
        AccessClass::Public,
        AccessClass::AuthOnly,
        AccessClass::Private,
    ];

    #[test]
    fn test_public_always_allows() {
        let targets = RedirectTargets::default();
        for viewer in viewers() {
            assert_eq!(
                decide(AccessClass::Public, &viewer, "/products", &targets),
                AccessDecision::allow()
            );
        }
    }

    #[test]
    fn test_private_redirects_anonymous_to_sign_in_with_return() {
        let targets = RedirectTargets::default();
        let decision = decide(
            AccessClass::Private,
            &ViewerState::anonymous(),
            "/cart",
            &targets,
        );
        assert_eq!(
            decision,
            AccessDecision::redirect(Redirect::with_return("/login", "/cart"))
        );

        let decision = decide(AccessClass::Private, &signed_in(), "/cart", &targets);
        assert!(decision.allow);
    }

    #[test]
    fn test_auth_only_redirects_signed_in_to_landing() {
        let targets = RedirectTargets::default();
        let decision = decide(AccessClass::AuthOnly, &signed_in(), "/login", &targets);
        assert_eq!(decision, AccessDecision::redirect(Redirect::to("/")));

        let decision = decide(
            AccessClass::AuthOnly,
            &ViewerState::anonymous(),
            "/login",
            &targets,
        );
        assert!(decision.allow);
    }

    #[test]
    fn test_decide_is_pure_and_bounded() {
        let targets = RedirectTargets::default();
        for viewer in viewers() {
            for access in CLASSES {
                let first = decide(access, &viewer, "/checkout", &targets);
                let second = decide(access, &viewer, "/checkout", &targets);
                assert_eq!(first, second);

                match (first.allow, first.redirect_to.as_ref()) {
                    (true, None) => {}
                    (false, Some(redirect)) if access == AccessClass::Private => {
                        assert_eq!(redirect.to, targets.sign_in);
                        assert_eq!(redirect.return_to.as_deref(), Some("/checkout"));
                    }
                    (false, Some(redirect)) if access == AccessClass::AuthOnly => {
                        assert_eq!(redirect.to, targets.landing);
                        assert!(redirect.return_to.is_none());
                    }
                    other => panic!("unexpected decision {:?} for {}", other, access),
                }
            }
        }
    }

    #[test]
    fn test_custom_targets_are_used() {
        let targets = RedirectTargets {
            sign_in: "/account/sign-in".to_string(),
            landing: "/profile".to_string(),
        };
        let decision = decide(AccessClass::AuthOnly, &signed_in(), "/register", &targets);
        assert_eq!(decision.redirect_to.unwrap().to, "/profile");
    }

    #[test]
    fn test_return_target() {
        assert_eq!(
            return_target("/login?redirect=%2Fcart", "redirect"),
            Some("/cart".to_string())
        );
        assert_eq!(
            return_target("/login?x=1&redirect=%2Fproduct%2F42#top", "redirect"),
            Some("/product/42".to_string())
        );
        assert_eq!(return_target("/login", "redirect"), None);
        assert_eq!(
            return_target("/login?redirect=https%3A%2F%2Fevil.example", "redirect"),
            None
        );
        assert_eq!(return_target("/login?redirect=%2F%2Fevil", "redirect"), None);
        assert_eq!(return_target("/login?redirect=%2F%5Cevil.example", "redirect"), None);
    }
}
