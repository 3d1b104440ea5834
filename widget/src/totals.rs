//! Savings math for the "amount saved" readout: cart-level discounts, plus
//! compare-at price deltas, plus a flat bonus per subscription unit.

use storefront::Cart;

use crate::slots::DisplayItem;

/// Total saved in cents across the whole cart (unfiltered; the display
/// filter only affects the slot board, not the savings readout).
pub fn amount_saved(cart: &Cart, items: &[DisplayItem], subscription_bonus_cents: i64) -> i64 {
    let mut saved = cart.total_discount;

    for item in items {
        let quantity = i64::from(item.line.quantity.max(1));

        if let Some(compare_at) = item.compare_at_price {
            if compare_at > item.line.final_price {
                saved += (compare_at - item.line.final_price) * quantity;
            }
        }

        if item.line.is_subscription() {
            saved += subscription_bonus_cents * quantity;
        }
    }

    saved
}

pub fn dollars(cents: i64) -> String {
    format!("${:.2}", cents as f64 / 100.0)
}
