//! # Bundle cart widgets
//!
//! Client-side engines for the storefront bundle and gift-box sections.
//!
//! ## Flow
//!
//! - The embedding layer parses the container's data attributes into
//!   [`Settings`] and constructs one controller per section instance.
//! - UI interactions become [`WidgetEvent`]s on an mpsc channel; the
//!   controller task drains them, renders optimistically, issues the cart
//!   calls, and schedules debounced refreshes.
//! - Every applied refresh publishes a new [`Frame`] on a watch channel
//!   and a [`CartRefreshed`] notification on a broadcast channel for the
//!   rest of the theme (cart drawer, header count).
//!
//! ## Sync model
//!
//! The authoritative cart always wins. Optimistic renders are provisional
//! and are overwritten by the next refresh; refreshes are debounced
//! (500ms, 300ms for passive cart events) and sequence-guarded so a slow
//! superseded response can never overwrite a newer one. A failed refresh
//! keeps the previous frame: stale but consistent.

pub mod controller;
pub mod error;
pub mod frame;
pub mod giftbox;
pub mod progress;
pub mod scheduler;
pub mod settings;
pub mod slots;
pub mod sync;
pub mod totals;

pub use controller::{BundleWidget, CartRefreshed, ProductCard, SyncPhase, WidgetEvent};
pub use error::WidgetError;
pub use frame::{Frame, SlotCard, SlotRender};
pub use giftbox::{BoxFrame, BoxItem, CheckoutRedirect, GiftBoxWidget};
pub use settings::{DisplayFilter, Placeholder, Settings};
pub use slots::{DisplayItem, SlotAssignment, TagKind};
pub use sync::CartSnapshot;
