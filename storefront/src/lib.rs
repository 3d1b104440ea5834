//! # Storefront
//!
//! Typed client for the external cart/product resource.
//!
//! ## Endpoints
//!
//! - `GET /cart.js`: authoritative cart snapshot (line items, totals,
//!   discounts).
//! - `POST /cart/add.js`: add line items, optionally with a selling plan
//!   and line properties.
//! - `POST /cart/change.js`: set a line's quantity by line key or variant
//!   id; quantity 0 removes the line.
//! - `GET /products/{handle}.js`: product metadata (variants with
//!   compare-at prices, tags, collections).
//!
//! ## Notes
//!
//! The resource is external and its payloads drift: every field except the
//! ones we key on tolerates absence and decodes to a default. A response
//! that fails to decode at all is reported as an error, never a panic.

pub mod cart;
pub mod client;
pub mod product;

pub use cart::{AddItem, AddRequest, Cart, CartItem, ChangeRequest};
pub use client::{StorefrontClient, StorefrontError};
pub use product::{Product, Variant, handle_from_url};
