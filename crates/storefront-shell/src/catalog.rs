//! Storefront view modules.
//!
//! Placeholder content for every view the storefront routes to. Each module
//! is fetched through the deferred loader with a simulated latency, which is
//! what the console drives.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use storefront_core::storefront::views;
use storefront_core::CoreResult;

use crate::error::{LoadFailure, RenderFault};
use crate::registry::ViewRegistry;
use crate::view::{Rendered, View, ViewContext, ViewHandle};

fn money(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn greeting(ctx: &ViewContext<'_>) -> String {
    match ctx.viewer.identity() {
        Some(identity) => format!("Signed in as {}", identity.display_name),
        None => "Browsing as a guest".to_string(),
    }
}

// =============================================================================
// Home Sections
// =============================================================================

struct HowItWorks;

impl View for HowItWorks {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("How it works")
            .line("1. Browse the catalog")
            .line("2. Add to cart")
            .line("3. Check out"))
    }
}

struct Testimonials;

impl View for Testimonials {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("What our customers say")
            .line("\"Fast delivery and great quality.\"")
            .line("\"My go-to shop for gifts.\""))
    }
}

struct NewsletterSignup;

impl View for NewsletterSignup {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("Newsletter").line("Subscribe for weekly deals"))
    }
}

struct CallToAction;

impl View for CallToAction {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let line = if ctx.viewer.is_authenticated() {
            "Pick up where you left off: /products"
        } else {
            "Create an account: /register"
        };
        Ok(Rendered::new("Start shopping").line(line))
    }
}

// =============================================================================
// Catalog Pages
// =============================================================================

struct Products;

impl View for Products {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let mut page = Rendered::new("Products").line(greeting(ctx));
        if let Some(category) = ctx.params.get("category") {
            page = page.line(format!("Category: {}", category));
        }
        if let Some((_, query)) = ctx.location.split_once('?') {
            page = page.line(format!("Filters: {}", query));
        }
        Ok(page.line(format!("Theme: {}", ctx.theme)))
    }
}

struct ProductDetail;

impl View for ProductDetail {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let id = ctx
            .params
            .get("id")
            .ok_or_else(|| RenderFault::new("product id missing from route"))?;
        Ok(Rendered::new(format!("Product {}", id)).line("In stock"))
    }
}

// =============================================================================
// Account Pages
// =============================================================================

struct Login;

impl View for Login {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let mut page = Rendered::new("Sign in").line("login <user> [name]");
        if ctx.location.contains('?') {
            page = page.line("You'll be returned to the page you asked for");
        }
        Ok(page)
    }
}

struct Register;

impl View for Register {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("Create account"))
    }
}

struct ForgotPassword;

impl View for ForgotPassword {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("Reset password").line("We'll email you a reset link"))
    }
}

struct Profile;

impl View for Profile {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let identity = ctx
            .viewer
            .identity()
            .ok_or_else(|| RenderFault::new("profile rendered without an identity"))?;
        Ok(Rendered::new("Your profile")
            .line(format!("Name: {}", identity.display_name))
            .line(format!("User: {}", identity.user_id))
            .line(format!("Session: {}", identity.session_id)))
    }
}

// =============================================================================
// Purchase Pages
// =============================================================================

struct Cart;

impl View for Cart {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        let page = Rendered::new("Your cart");
        if ctx.cart.is_empty() {
            return Ok(page.line("Your cart is empty"));
        }
        Ok(page
            .line(format!(
                "{} item(s), {} unit(s)",
                ctx.cart.item_count, ctx.cart.total_quantity
            ))
            .line(format!("Subtotal: {}", money(ctx.cart.subtotal_cents))))
    }
}

struct Checkout;

impl View for Checkout {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        if ctx.cart.is_empty() {
            return Err(RenderFault::new("checkout opened with an empty cart"));
        }
        Ok(Rendered::new("Checkout")
            .line(format!("Total due: {}", money(ctx.cart.subtotal_cents)))
            .line(greeting(ctx)))
    }
}

struct OrderSuccess;

impl View for OrderSuccess {
    fn render(&self, _ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("Thank you for your order"))
    }
}

struct NotFound;

impl View for NotFound {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<Rendered, RenderFault> {
        Ok(Rendered::new("Page not found").line(format!("Nothing lives at {}", ctx.location)))
    }
}

// =============================================================================
// Registry
// =============================================================================

fn modules() -> Vec<(&'static str, ViewHandle)> {
    vec![
        (views::HOW_IT_WORKS, Arc::new(HowItWorks) as ViewHandle),
        (views::TESTIMONIALS, Arc::new(Testimonials)),
        (views::NEWSLETTER_SIGNUP, Arc::new(NewsletterSignup)),
        (views::CALL_TO_ACTION, Arc::new(CallToAction)),
        (views::PRODUCTS, Arc::new(Products)),
        (views::PRODUCT_DETAIL, Arc::new(ProductDetail)),
        (views::LOGIN, Arc::new(Login)),
        (views::REGISTER, Arc::new(Register)),
        (views::FORGOT_PASSWORD, Arc::new(ForgotPassword)),
        (views::PROFILE, Arc::new(Profile)),
        (views::CART, Arc::new(Cart)),
        (views::CHECKOUT, Arc::new(Checkout)),
        (views::ORDER_SUCCESS, Arc::new(OrderSuccess)),
        (views::NOT_FOUND, Arc::new(NotFound)),
    ]
}

/// Registers every storefront view.
///
/// Each fetch waits `latency`. Views named in `flaky` fail their first fetch,
/// so retry behaviour can be exercised.
pub fn storefront_registry(latency: Duration, flaky: &[String]) -> CoreResult<ViewRegistry> {
    let flaky: HashSet<&str> = flaky.iter().map(String::as_str).collect();
    let mut builder = ViewRegistry::builder();

    for (id, module) in modules() {
        let fail_first = flaky.contains(id);
        let attempts = Arc::new(AtomicUsize::new(0));

        builder.register(id, move || {
            let module = Arc::clone(&module);
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(latency).await;
                if fail_first && attempt == 0 {
                    return Err(LoadFailure::fetch(id, "simulated network error"));
                }
                Ok(module)
            }
        })?;
    }

    Ok(builder.seal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartTotals;
    use crate::theme::Theme;
    use storefront_core::{RouteParams, RouteTable, ViewId, ViewerState};

    fn render(view: &dyn View, location: &str, cart: &CartTotals) -> Result<Rendered, RenderFault> {
        let id = ViewId::new("test");
        let params = RouteParams::default();
        let viewer = ViewerState::anonymous();
        view.render(&ViewContext {
            view: &id,
            location,
            params: &params,
            viewer: &viewer,
            theme: Theme::Light,
            cart,
        })
    }

    #[test]
    fn test_registry_covers_storefront_table() {
        let registry = storefront_registry(Duration::ZERO, &[]).unwrap();
        let table = RouteTable::storefront().unwrap();
        assert!(registry.verify(&table).is_ok());
        assert_eq!(registry.len(), 14);
    }

    #[test]
    fn test_checkout_faults_on_empty_cart() {
        let empty = CartTotals::default();
        assert!(render(&Checkout, "/checkout", &empty).is_err());

        let filled = CartTotals {
            item_count: 1,
            total_quantity: 2,
            subtotal_cents: 2450,
            owner: Some("ada".into()),
        };
        let page = render(&Checkout, "/checkout", &filled).unwrap();
        assert_eq!(page.lines[0], "Total due: $24.50");
    }

    #[test]
    fn test_profile_requires_identity() {
        assert!(render(&Profile, "/profile", &CartTotals::default()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flaky_view_fails_once() {
        use crate::loader::{DeferredLoader, LoadResult};

        let registry =
            storefront_registry(Duration::from_millis(10), &["testimonials".to_string()]).unwrap();
        let reference = registry.resolve(&ViewId::new("testimonials")).unwrap();
        let loader = DeferredLoader::new(Duration::from_secs(1));

        assert!(matches!(loader.resolve(&reference).await, LoadResult::Failed(_)));
        assert!(loader.resolve(&reference).await.is_ready());
    }
}
