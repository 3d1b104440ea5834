//! # Slot assignment
//!
//! Maps cart lines onto the fixed row of bundle slots.
//!
//! Lines are walked in cart order. Each consumes as many consecutive empty
//! slots as its effective weight: a fixed 3 for `trio-bundle`-tagged
//! products, a fixed 5 for `collection`-tagged products, otherwise one slot
//! per unit of quantity. Units after the first render as duplicates of the
//! same line. Once slots run out the remaining display is dropped; the cart
//! itself is never touched.

use storefront::CartItem;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagKind {
    #[default]
    None,
    TrioBundle,
    Collection,
}

impl TagKind {
    /// Case-insensitive match against product tags; `collection` wins over
    /// `trio-bundle` when both are present.
    pub fn from_tags(tags: &[String]) -> Self {
        let mut kind = TagKind::None;

        for tag in tags {
            match tag.trim().to_lowercase().as_str() {
                "collection" => return TagKind::Collection,
                "trio-bundle" => kind = TagKind::TrioBundle,
                _ => {}
            }
        }

        kind
    }

    pub fn fixed_weight(self) -> Option<u32> {
        match self {
            TagKind::Collection => Some(5),
            TagKind::TrioBundle => Some(3),
            TagKind::None => None,
        }
    }
}

/// A cart line annotated with the product metadata resolved for it.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub line: CartItem,
    pub tag: TagKind,
    pub compare_at_price: Option<i64>,
    pub collection_title: String,
}

impl DisplayItem {
    /// A line with no resolved metadata; also the degraded result when a
    /// product lookup fails.
    pub fn untagged(line: CartItem) -> Self {
        Self {
            line,
            tag: TagKind::None,
            compare_at_price: None,
            collection_title: String::new(),
        }
    }

    /// Slots this line counts for: fixed for tagged products, otherwise one
    /// per unit.
    pub fn effective_weight(&self) -> u32 {
        self.tag
            .fixed_weight()
            .unwrap_or_else(|| self.line.quantity.max(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment {
    pub slot_index: usize,
    pub variant_id: u64,
    pub title: String,
    pub image: String,
    pub collection_title: String,
    pub tag: TagKind,
    pub is_duplicate: bool,
}

pub fn assign_slots(items: &[&DisplayItem], slot_count: usize) -> Vec<Option<SlotAssignment>> {
    let mut slots: Vec<Option<SlotAssignment>> = vec![None; slot_count];
    let mut next = 0;

    for item in items {
        if next >= slot_count {
            debug!(
                variant_id = item.line.variant_id,
                "no slots left, dropping line from display"
            );
            continue;
        }

        for unit in 0..item.effective_weight() {
            if next >= slot_count {
                break;
            }

            slots[next] = Some(SlotAssignment {
                slot_index: next,
                variant_id: item.line.variant_id,
                title: item.line.display_title().to_string(),
                image: item.line.image.clone(),
                collection_title: item.collection_title.clone(),
                tag: item.tag,
                is_duplicate: unit > 0,
            });
            next += 1;
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(variant_id: u64, quantity: u32) -> CartItem {
        CartItem {
            variant_id,
            quantity,
            product_title: format!("Set {variant_id}"),
            ..CartItem::default()
        }
    }

    fn item(variant_id: u64, quantity: u32, tag: TagKind) -> DisplayItem {
        DisplayItem {
            tag,
            ..DisplayItem::untagged(line(variant_id, quantity))
        }
    }

    fn filled(slots: &[Option<SlotAssignment>]) -> usize {
        slots.iter().flatten().count()
    }

    #[test]
    fn tag_matching_is_case_insensitive_and_collection_wins() {
        assert_eq!(
            TagKind::from_tags(&["New".to_string(), " Trio-Bundle ".to_string()]),
            TagKind::TrioBundle
        );
        assert_eq!(
            TagKind::from_tags(&["trio-bundle".to_string(), "Collection".to_string()]),
            TagKind::Collection
        );
        assert_eq!(TagKind::from_tags(&["new".to_string()]), TagKind::None);
    }

    #[test]
    fn untagged_line_uses_quantity() {
        let items = [item(1, 3, TagKind::None)];
        let refs: Vec<&DisplayItem> = items.iter().collect();
        let slots = assign_slots(&refs, 5);

        assert_eq!(filled(&slots), 3);
        assert!(!slots[0].as_ref().unwrap().is_duplicate);
        assert!(slots[1].as_ref().unwrap().is_duplicate);
        assert!(slots[2].as_ref().unwrap().is_duplicate);
        assert!(slots[3].is_none());
    }

    #[test]
    fn trio_bundle_occupies_three_slots_at_quantity_one() {
        let items = [item(1, 1, TagKind::TrioBundle)];
        let refs: Vec<&DisplayItem> = items.iter().collect();
        let slots = assign_slots(&refs, 5);

        assert_eq!(filled(&slots), 3);
        assert!(slots[0..3]
            .iter()
            .flatten()
            .all(|assignment| assignment.tag == TagKind::TrioBundle));
    }

    #[test]
    fn collection_fills_the_whole_board() {
        let items = [item(1, 1, TagKind::Collection)];
        let refs: Vec<&DisplayItem> = items.iter().collect();
        let slots = assign_slots(&refs, 5);

        assert_eq!(filled(&slots), 5);
    }

    #[test]
    fn partial_capacity_truncates_and_keeps_duplicate_marking() {
        let items = [item(1, 1, TagKind::None), item(2, 1, TagKind::Collection)];
        let refs: Vec<&DisplayItem> = items.iter().collect();
        let slots = assign_slots(&refs, 5);

        assert_eq!(filled(&slots), 5);
        assert_eq!(slots[1].as_ref().unwrap().variant_id, 2);
        assert!(!slots[1].as_ref().unwrap().is_duplicate);
        assert!(slots[4].as_ref().unwrap().is_duplicate);
    }

    #[test]
    fn excess_lines_are_dropped_in_cart_order() {
        let items = [
            item(1, 2, TagKind::None),
            item(2, 1, TagKind::TrioBundle),
            item(3, 1, TagKind::None),
        ];
        let refs: Vec<&DisplayItem> = items.iter().collect();
        let slots = assign_slots(&refs, 5);

        assert_eq!(filled(&slots), 5);
        assert_eq!(slots[4].as_ref().unwrap().variant_id, 2);
        assert!(slots.iter().flatten().all(|a| a.variant_id != 3));
    }

    #[test]
    fn assigned_weight_never_exceeds_capacity() {
        for slot_count in 0..6 {
            for quantity in 1..8 {
                let items = [
                    item(1, quantity, TagKind::None),
                    item(2, 1, TagKind::TrioBundle),
                    item(3, 1, TagKind::Collection),
                ];
                let refs: Vec<&DisplayItem> = items.iter().collect();
                let slots = assign_slots(&refs, slot_count);

                assert!(filled(&slots) <= slot_count);
                for (index, slot) in slots.iter().enumerate() {
                    if let Some(assignment) = slot {
                        assert_eq!(assignment.slot_index, index);
                    }
                }
            }
        }
    }
}
