//! # Cart sync
//!
//! Builds one authoritative snapshot: the cart plus per-line product
//! metadata (tags, compare-at price, collection title), fetched
//! concurrently for all lines. A line whose product lookup fails degrades
//! to an untagged line with no metadata; the refresh still completes.

use storefront::{Cart, StorefrontClient, StorefrontError, handle_from_url};
use tokio::task::JoinSet;
use tracing::warn;

use crate::{
    frame::{Frame, SlotCard, SlotRender},
    progress,
    settings::{DisplayFilter, Settings},
    slots::{self, DisplayItem, TagKind},
    totals,
};

#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub items: Vec<DisplayItem>,
}

#[derive(Debug, Clone, Default)]
struct ItemMeta {
    tag: TagKind,
    compare_at_price: Option<i64>,
    collection_title: String,
}

pub async fn fetch_snapshot(client: &StorefrontClient) -> Result<CartSnapshot, StorefrontError> {
    let cart = client.fetch_cart().await?;

    let mut lookups = JoinSet::new();
    for (index, line) in cart.items.iter().enumerate() {
        let client = client.clone();
        let variant_id = line.variant_id;
        let handle = line.handle.clone().or_else(|| handle_from_url(&line.url));

        lookups.spawn(async move {
            let meta = match handle {
                Some(handle) => lookup(&client, &handle, variant_id).await,
                None => ItemMeta::default(),
            };

            (index, meta)
        });
    }

    let mut metas = vec![ItemMeta::default(); cart.items.len()];
    while let Some(joined) = lookups.join_next().await {
        if let Ok((index, meta)) = joined {
            metas[index] = meta;
        }
    }

    let items = cart
        .items
        .iter()
        .cloned()
        .zip(metas)
        .map(|(line, meta)| DisplayItem {
            line,
            tag: meta.tag,
            compare_at_price: meta.compare_at_price,
            collection_title: meta.collection_title,
        })
        .collect();

    Ok(CartSnapshot { cart, items })
}

async fn lookup(client: &StorefrontClient, handle: &str, variant_id: u64) -> ItemMeta {
    match client.fetch_product(handle).await {
        Ok(product) => ItemMeta {
            tag: TagKind::from_tags(&product.tags),
            compare_at_price: product
                .variant(variant_id)
                .and_then(|variant| variant.compare_at_price),
            collection_title: product.collection_title(),
        },
        Err(error) => {
            warn!(%handle, %error, "could not fetch product data for cart line");
            ItemMeta::default()
        }
    }
}

/// Turn a snapshot into the frame the widget renders: filter, assign
/// slots, summarize progress, total up savings.
pub fn build_frame(settings: &Settings, snapshot: &CartSnapshot) -> Frame {
    let display: Vec<&DisplayItem> = match settings.display_filter() {
        DisplayFilter::All => snapshot.items.iter().collect(),
        DisplayFilter::SubscriptionOnly => snapshot
            .items
            .iter()
            .filter(|item| item.line.is_subscription())
            .collect(),
        DisplayFilter::NonSubscriptionOnly => snapshot
            .items
            .iter()
            .filter(|item| !item.line.is_subscription())
            .collect(),
    };

    let assignments = slots::assign_slots(&display, settings.total_slots);
    let rendered = assignments
        .iter()
        .enumerate()
        .map(|(index, assignment)| match assignment {
            Some(assignment) => SlotRender::Filled(SlotCard::from_assignment(assignment)),
            None => SlotRender::Empty(settings.placeholder(index)),
        })
        .collect();

    let effective: u32 = display.iter().map(|item| item.effective_weight()).sum();
    let total = settings.total_slots as u32;

    Frame {
        slots: rendered,
        progress: progress::summarize(effective, total, &settings.step_messages),
        steps_reached: (1..=total).map(|step| effective >= step).collect(),
        total_price: snapshot.cart.total_price,
        amount_saved: totals::amount_saved(
            &snapshot.cart,
            &snapshot.items,
            settings.subscription_bonus_cents,
        ),
        card_quantities: snapshot
            .cart
            .items
            .iter()
            .map(|line| (line.variant_id, line.quantity))
            .collect(),
    }
}
