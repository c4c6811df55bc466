//! # Storefront Route Declarations
//!
//! The concrete route table served by the storefront. These are the only
//! externally reachable paths.
//!
//! ```text
//! Path                   Access     View
//! ────                   ──────     ────
//! /                      Public     home sections (4 deferred regions)
//! /products              Public     products
//! /product/:id           Public     product-detail
//! /search                Public     products
//! /category/:category    Public     products
//! /login                 AuthOnly   login
//! /register              AuthOnly   register
//! /forgot-password       AuthOnly   forgot-password
//! /profile               Private    profile
//! /cart                  Private    cart
//! /checkout              Private    checkout
//! /order-success         Private    order-success
//! *                      Public     not-found
//! ```

use crate::error::CoreResult;
use crate::route::{RouteEntry, RouteTable};
use crate::types::{AccessClass, ViewId, ViewTarget};

/// View ids of the storefront's deferred modules.
pub mod views {
    pub const HOW_IT_WORKS: &str = "how-it-works";
    pub const TESTIMONIALS: &str = "testimonials";
    pub const NEWSLETTER_SIGNUP: &str = "newsletter-signup";
    pub const CALL_TO_ACTION: &str = "call-to-action";
    pub const PRODUCTS: &str = "products";
    pub const PRODUCT_DETAIL: &str = "product-detail";
    pub const LOGIN: &str = "login";
    pub const REGISTER: &str = "register";
    pub const FORGOT_PASSWORD: &str = "forgot-password";
    pub const PROFILE: &str = "profile";
    pub const CART: &str = "cart";
    pub const CHECKOUT: &str = "checkout";
    pub const ORDER_SUCCESS: &str = "order-success";
    pub const NOT_FOUND: &str = "not-found";

    /// Home page sections, in display order.
    pub const HOME_SECTIONS: [&str; 4] =
        [HOW_IT_WORKS, TESTIMONIALS, NEWSLETTER_SIGNUP, CALL_TO_ACTION];
}

fn page(id: &str) -> ViewTarget {
    ViewTarget::Page(ViewId::new(id))
}

impl RouteTable {
    /// Builds the storefront's route table.
    pub fn storefront() -> CoreResult<Self> {
        use AccessClass::{AuthOnly, Private, Public};

        let home = ViewTarget::Sections(
            views::HOME_SECTIONS
                .iter()
                .map(|id| ViewId::new(*id))
                .collect(),
        );

        RouteTable::new(vec![
            // Public
            RouteEntry::new("home", "/", Public, home)?,
            RouteEntry::new("products", "/products", Public, page(views::PRODUCTS))?,
            RouteEntry::new("product-detail", "/product/:id", Public, page(views::PRODUCT_DETAIL))?,
            RouteEntry::new("search", "/search", Public, page(views::PRODUCTS))?,
            RouteEntry::new("category", "/category/:category", Public, page(views::PRODUCTS))?,
            // Authentication flows
            RouteEntry::new("login", "/login", AuthOnly, page(views::LOGIN))?,
            RouteEntry::new("register", "/register", AuthOnly, page(views::REGISTER))?,
            RouteEntry::new(
                "forgot-password",
                "/forgot-password",
                AuthOnly,
                page(views::FORGOT_PASSWORD),
            )?,
            // Protected
            RouteEntry::new("profile", "/profile", Private, page(views::PROFILE))?,
            RouteEntry::new("cart", "/cart", Private, page(views::CART))?,
            RouteEntry::new("checkout", "/checkout", Private, page(views::CHECKOUT))?,
            RouteEntry::new(
                "order-success",
                "/order-success",
                Private,
                page(views::ORDER_SUCCESS),
            )?,
            // 404
            RouteEntry::new("not-found", "*", Public, page(views::NOT_FOUND))?,
        ])
    }
}
