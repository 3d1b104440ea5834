//! # Gift box
//!
//! The build-a-gift-box widget keeps its selections in memory only; the
//! server cart is untouched until checkout packs everything into one gift
//! product line. The box clears on successful checkout, never before.

use std::collections::HashMap;

use storefront::{AddItem, AddRequest, StorefrontClient};
use tokio::sync::watch;

use crate::{
    controller::ProductCard,
    error::WidgetError,
    frame::{SlotCard, SlotRender},
    progress::{self, REMAINING_TOKEN},
    settings::{Placeholder, Settings},
    slots::TagKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BoxItem {
    pub slot: usize,
    pub variant_id: u64,
    pub product_id: Option<u64>,
    pub handle: Option<String>,
    pub title: String,
    pub image: String,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxFrame {
    pub slots: Vec<SlotRender>,
    pub selected: u32,
    pub remaining: u32,
    pub percent: f32,
    pub message: String,
    /// The note step unlocks only when the box is full.
    pub note_enabled: bool,
    pub card_quantities: HashMap<u64, u32>,
}

#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub url: String,
}

pub struct GiftBoxWidget {
    settings: Settings,
    client: StorefrontClient,
    items: Vec<BoxItem>,
    frame_tx: watch::Sender<BoxFrame>,
}

impl GiftBoxWidget {
    pub fn new(settings: Settings, client: StorefrontClient) -> Self {
        let mut widget = Self {
            settings,
            client,
            items: Vec::new(),
            frame_tx: watch::channel(BoxFrame {
                slots: Vec::new(),
                selected: 0,
                remaining: 0,
                percent: 0.0,
                message: String::new(),
                note_enabled: false,
                card_quantities: HashMap::new(),
            })
            .0,
        };

        widget.publish();
        widget
    }

    pub fn capacity(&self) -> usize {
        self.settings.total_slots
    }

    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.items.len())
    }

    pub fn items(&self) -> &[BoxItem] {
        &self.items
    }

    pub fn quantity_of(&self, variant_id: u64) -> u32 {
        self.items
            .iter()
            .filter(|item| item.variant_id == variant_id)
            .count() as u32
    }

    pub fn note_ready(&self) -> bool {
        self.items.len() == self.capacity()
    }

    pub fn frame(&self) -> BoxFrame {
        self.frame_tx.borrow().clone()
    }

    pub fn frames(&self) -> watch::Receiver<BoxFrame> {
        self.frame_tx.subscribe()
    }

    /// Place one unit into the first empty slot. Rendered immediately;
    /// nothing is sent to the cart.
    pub fn add(&mut self, card: &ProductCard) -> Result<usize, WidgetError> {
        if self.items.len() >= self.capacity() {
            return Err(WidgetError::BoxFull {
                capacity: self.capacity(),
            });
        }

        let slot = (0..self.capacity())
            .find(|candidate| self.items.iter().all(|item| item.slot != *candidate))
            .unwrap_or(self.items.len());

        self.items.push(BoxItem {
            slot,
            variant_id: card.variant_id,
            product_id: card.product_id,
            handle: card.handle.clone(),
            title: card.title.clone(),
            image: card.image.clone(),
            collection: card.collection.clone(),
        });
        self.publish();

        Ok(slot)
    }

    pub fn remove_slot(&mut self, slot: usize) {
        self.items.retain(|item| item.slot != slot);
        self.publish();
    }

    /// Remove one unit of a variant, lowest slot first.
    pub fn remove_variant(&mut self, variant_id: u64) -> bool {
        let mut slots: Vec<usize> = self
            .items
            .iter()
            .filter(|item| item.variant_id == variant_id)
            .map(|item| item.slot)
            .collect();
        slots.sort_unstable();

        match slots.first() {
            Some(&slot) => {
                self.remove_slot(slot);
                true
            }
            None => false,
        }
    }

    /// Reconcile the box to a requested per-variant quantity. Stops at
    /// capacity with a validation error; the applied quantity is readable
    /// through [`Self::quantity_of`].
    pub fn set_quantity(&mut self, card: &ProductCard, quantity: u32) -> Result<u32, WidgetError> {
        while self.quantity_of(card.variant_id) > quantity {
            self.remove_variant(card.variant_id);
        }

        while self.quantity_of(card.variant_id) < quantity {
            if self.add(card).is_err() {
                return Err(WidgetError::BoxFull {
                    capacity: self.capacity(),
                });
            }
        }

        Ok(self.quantity_of(card.variant_id))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.publish();
    }

    /// Pack the box into the configured gift product: one unit of its
    /// first variant, selections and the note attached as line properties.
    /// Awaited intentionally; the embedder navigates to the returned url
    /// only on success.
    pub async fn checkout(&mut self, note: &str) -> Result<CheckoutRedirect, WidgetError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(WidgetError::NoteRequired);
        }

        let handle = self
            .settings
            .gift_box_handle
            .clone()
            .ok_or(WidgetError::GiftProductUnconfigured)?;

        let product = self.client.fetch_product(&handle).await?;
        let variant = product
            .variants
            .first()
            .ok_or_else(|| WidgetError::NoVariant {
                handle: handle.clone(),
            })?;

        let mut item = AddItem::new(variant.id, 1);
        let mut ordered = self.items.clone();
        ordered.sort_by_key(|selection| selection.slot);
        for (index, selection) in ordered.iter().enumerate() {
            item = item.with_property(format!("Gift Item {}", index + 1), selection.title.clone());
        }
        item = item.with_property("Gift Note", note);

        self.client.add_items(&AddRequest::single(item)).await?;
        self.clear();

        Ok(CheckoutRedirect {
            url: "/cart".to_string(),
        })
    }

    fn publish(&self) {
        self.frame_tx.send_replace(self.build_frame());
    }

    fn build_frame(&self) -> BoxFrame {
        let capacity = self.capacity();
        let selected = self.items.len() as u32;
        let remaining = (capacity as u32).saturating_sub(selected);

        let placeholder = Placeholder {
            label: self.settings.box_slot_label.clone(),
            hint: self
                .settings
                .box_slot_hint
                .replace(REMAINING_TOKEN, &remaining.to_string()),
        };

        let mut slots: Vec<SlotRender> = (0..capacity)
            .map(|_| SlotRender::Empty(placeholder.clone()))
            .collect();
        for item in &self.items {
            if item.slot < capacity {
                slots[item.slot] = SlotRender::Filled(SlotCard {
                    variant_id: item.variant_id,
                    title: item.title.clone(),
                    image: item.image.clone(),
                    collection_title: item.collection.clone(),
                    quantity: 1,
                    tag: TagKind::None,
                    is_duplicate: false,
                });
            }
        }

        let message = if remaining == 0 {
            self.settings.box_complete_text.clone()
        } else {
            self.settings
                .box_progress_template
                .replace(REMAINING_TOKEN, &remaining.to_string())
        };

        let mut card_quantities = HashMap::new();
        for item in &self.items {
            *card_quantities.entry(item.variant_id).or_insert(0) += 1;
        }

        BoxFrame {
            slots,
            selected,
            remaining,
            percent: progress::percent(selected, capacity as u32),
            message,
            note_enabled: selected as usize == capacity,
            card_quantities,
        }
    }
}
