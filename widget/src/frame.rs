//! The typed render target a widget publishes. The embedding layer maps a
//! `Frame` onto the on-page elements; tests compare frames directly.

use std::collections::HashMap;

use crate::{
    progress::{self, Progress},
    settings::{Placeholder, Settings},
    slots::{SlotAssignment, TagKind},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SlotRender {
    Filled(SlotCard),
    Empty(Placeholder),
}

impl SlotRender {
    pub fn is_filled(&self) -> bool {
        matches!(self, SlotRender::Filled(_))
    }

    pub fn card(&self) -> Option<&SlotCard> {
        match self {
            SlotRender::Filled(card) => Some(card),
            SlotRender::Empty(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotCard {
    pub variant_id: u64,
    pub title: String,
    pub image: String,
    pub collection_title: String,
    pub quantity: u32,
    pub tag: TagKind,
    pub is_duplicate: bool,
}

impl SlotCard {
    pub fn from_assignment(assignment: &SlotAssignment) -> Self {
        Self {
            variant_id: assignment.variant_id,
            title: assignment.title.clone(),
            image: assignment.image.clone(),
            collection_title: assignment.collection_title.clone(),
            quantity: 1,
            tag: assignment.tag,
            is_duplicate: assignment.is_duplicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub slots: Vec<SlotRender>,
    pub progress: Progress,
    /// Whether each step 1..=total has been reached, for step icon swaps.
    pub steps_reached: Vec<bool>,
    pub total_price: i64,
    pub amount_saved: i64,
    /// Variant id to cart quantity, for quantity-selector sync on the
    /// product cards.
    pub card_quantities: HashMap<u64, u32>,
}

impl Frame {
    /// The frame shown before the first refresh: placeholders everywhere.
    pub fn initial(settings: &Settings) -> Self {
        let total = settings.total_slots as u32;

        Self {
            slots: (0..settings.total_slots)
                .map(|index| SlotRender::Empty(settings.placeholder(index)))
                .collect(),
            progress: progress::summarize(0, total, &settings.step_messages),
            steps_reached: vec![false; settings.total_slots],
            total_price: 0,
            amount_saved: 0,
            card_quantities: HashMap::new(),
        }
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_filled()).count()
    }

    pub fn quantity_of(&self, variant_id: u64) -> u32 {
        self.card_quantities.get(&variant_id).copied().unwrap_or(0)
    }
}
