//! Widget configuration, read from the attribute map of the
//! server-rendered container element. Absent attributes fall back to
//! defaults; unparseable values are logged and defaulted.

use std::{collections::HashMap, fmt::Display, str::FromStr, time::Duration};

use tracing::warn;

pub const DEFAULT_TOTAL_SLOTS: usize = 5;
pub const DEFAULT_REFRESH_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_PASSIVE_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SUBSCRIPTION_BONUS_CENTS: i64 = 300;

/// Empty-slot copy for one bundle slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub label: String,
    pub hint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFilter {
    All,
    SubscriptionOnly,
    NonSubscriptionOnly,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub total_slots: usize,
    pub refresh_debounce: Duration,
    pub passive_debounce: Duration,
    /// Incentive message templates for 0..=5 effective steps.
    pub step_messages: [String; 6],
    pub placeholders: Vec<Placeholder>,
    pub subscription_only: bool,
    pub non_subscription_only: bool,
    pub subscription_bonus_cents: i64,
    pub gift_box_handle: Option<String>,
    pub box_slot_label: String,
    pub box_slot_hint: String,
    pub box_progress_template: String,
    pub box_complete_text: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_slots: DEFAULT_TOTAL_SLOTS,
            refresh_debounce: Duration::from_millis(DEFAULT_REFRESH_DEBOUNCE_MS),
            passive_debounce: Duration::from_millis(DEFAULT_PASSIVE_DEBOUNCE_MS),
            step_messages: [
                "You are [X] sets away from 20% OFF".to_string(),
                "You are [X] sets away from 20% OFF".to_string(),
                "You are [X] sets away from 20% OFF".to_string(),
                "Just 2 more sets to unlock 20% OFF".to_string(),
                "Just 1 more set to unlock 20% OFF".to_string(),
                "We love to see it. 20% OFF applied.".to_string(),
            ],
            placeholders: vec![
                Placeholder {
                    label: "Start Your Stack".to_string(),
                    hint: "Add 3 sets to unlock VIP Status.".to_string(),
                },
                Placeholder {
                    label: "Weekday Look".to_string(),
                    hint: "You're 2 sets away from Free Shipping.".to_string(),
                },
                Placeholder {
                    label: "Unlock VIP".to_string(),
                    hint: "Add this for Free Ship + VIP Pricing.".to_string(),
                },
                Placeholder {
                    label: "Weekend Look".to_string(),
                    hint: "Get a luxury home for your nails next.".to_string(),
                },
                Placeholder {
                    label: "Collector's Piece".to_string(),
                    hint: "Velvet Box Unlocked.".to_string(),
                },
            ],
            subscription_only: false,
            non_subscription_only: false,
            subscription_bonus_cents: DEFAULT_SUBSCRIPTION_BONUS_CENTS,
            gift_box_handle: None,
            box_slot_label: "Select a Product".to_string(),
            box_slot_hint: "Add [X] more to fill your box.".to_string(),
            box_progress_template: "Add [X] sets to complete your gift box.".to_string(),
            box_complete_text: "Your gift box is complete!".to_string(),
        }
    }
}

impl Settings {
    pub fn from_attrs(attrs: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        let total_slots = try_load(attrs, "data-total-steps", defaults.total_slots);

        let mut step_messages = defaults.step_messages.clone();
        for (step, message) in step_messages.iter_mut().enumerate() {
            if let Some(text) = attrs.get(&format!("data-progress-text-step-{step}")) {
                *message = text.clone();
            }
        }

        let placeholders = (0..total_slots)
            .map(|index| {
                let fallback = &defaults.placeholders[index % defaults.placeholders.len()];
                Placeholder {
                    label: attrs
                        .get(&format!("data-slot-label-{}", index + 1))
                        .cloned()
                        .unwrap_or_else(|| fallback.label.clone()),
                    hint: attrs
                        .get(&format!("data-slot-hint-{}", index + 1))
                        .cloned()
                        .unwrap_or_else(|| fallback.hint.clone()),
                }
            })
            .collect();

        Self {
            total_slots,
            refresh_debounce: Duration::from_millis(try_load(
                attrs,
                "data-refresh-debounce-ms",
                DEFAULT_REFRESH_DEBOUNCE_MS,
            )),
            passive_debounce: Duration::from_millis(try_load(
                attrs,
                "data-passive-debounce-ms",
                DEFAULT_PASSIVE_DEBOUNCE_MS,
            )),
            step_messages,
            placeholders,
            subscription_only: flag(attrs, "data-cart-subscription-only"),
            non_subscription_only: flag(attrs, "data-cart-non-subscription-only"),
            subscription_bonus_cents: try_load(
                attrs,
                "data-subscription-bonus-cents",
                defaults.subscription_bonus_cents,
            ),
            gift_box_handle: attrs
                .get("data-gift-box-product-handle")
                .filter(|handle| !handle.is_empty())
                .cloned(),
            box_slot_label: attrs
                .get("data-box-slot-label")
                .cloned()
                .unwrap_or(defaults.box_slot_label),
            box_slot_hint: attrs
                .get("data-box-slot-hint")
                .cloned()
                .unwrap_or(defaults.box_slot_hint),
            box_progress_template: attrs
                .get("data-box-progress-text")
                .cloned()
                .unwrap_or(defaults.box_progress_template),
            box_complete_text: attrs
                .get("data-box-complete-text")
                .cloned()
                .unwrap_or(defaults.box_complete_text),
        }
    }

    /// A filter applies only when exactly one of the two flags is set.
    pub fn display_filter(&self) -> DisplayFilter {
        match (self.subscription_only, self.non_subscription_only) {
            (true, false) => DisplayFilter::SubscriptionOnly,
            (false, true) => DisplayFilter::NonSubscriptionOnly,
            _ => DisplayFilter::All,
        }
    }

    /// Placeholder copy for a slot, cycling the configured set.
    pub fn placeholder(&self, slot_index: usize) -> Placeholder {
        if self.placeholders.is_empty() {
            return Placeholder {
                label: String::new(),
                hint: String::new(),
            };
        }

        self.placeholders[slot_index % self.placeholders.len()].clone()
    }
}

fn flag(attrs: &HashMap<String, String>, key: &str) -> bool {
    attrs.get(key).is_some_and(|value| value == "true")
}

fn try_load<T: FromStr>(attrs: &HashMap<String, String>, key: &str, default: T) -> T
where
    T::Err: Display,
{
    match attrs.get(key) {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(error) => {
                warn!("invalid {key} value {raw:?}: {error}, using default");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_empty() {
        let settings = Settings::from_attrs(&HashMap::new());

        assert_eq!(settings.total_slots, 5);
        assert_eq!(settings.refresh_debounce, Duration::from_millis(500));
        assert_eq!(settings.passive_debounce, Duration::from_millis(300));
        assert_eq!(settings.display_filter(), DisplayFilter::All);
        assert_eq!(settings.gift_box_handle, None);
        assert_eq!(settings.placeholders.len(), 5);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let settings = Settings::from_attrs(&attrs(&[("data-total-steps", "lots")]));

        assert_eq!(settings.total_slots, 5);
    }

    #[test]
    fn parses_overrides() {
        let settings = Settings::from_attrs(&attrs(&[
            ("data-total-steps", "3"),
            ("data-progress-text-step-0", "Pick [X] more"),
            ("data-slot-label-2", "Second"),
            ("data-gift-box-product-handle", "gift-box"),
        ]));

        assert_eq!(settings.total_slots, 3);
        assert_eq!(settings.step_messages[0], "Pick [X] more");
        assert_eq!(settings.placeholders[1].label, "Second");
        assert_eq!(settings.gift_box_handle.as_deref(), Some("gift-box"));
    }

    #[test]
    fn filter_applies_only_when_exactly_one_flag_set() {
        let sub = Settings::from_attrs(&attrs(&[("data-cart-subscription-only", "true")]));
        let both = Settings::from_attrs(&attrs(&[
            ("data-cart-subscription-only", "true"),
            ("data-cart-non-subscription-only", "true"),
        ]));

        assert_eq!(sub.display_filter(), DisplayFilter::SubscriptionOnly);
        assert_eq!(both.display_filter(), DisplayFilter::All);
    }

    #[test]
    fn placeholders_cycle_past_configured_set() {
        let settings = Settings::from_attrs(&attrs(&[("data-total-steps", "7")]));

        assert_eq!(settings.placeholders.len(), 7);
        assert_eq!(settings.placeholders[5], settings.placeholders[0]);
        assert_eq!(settings.placeholder(6), settings.placeholder(1));
    }
}
