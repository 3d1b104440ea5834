//! Progress and incentive copy. The calculator derives numbers and picks
//! from externally supplied templates; it never invents copy of its own.

/// Token replaced with the remaining step count in message templates.
pub const REMAINING_TOKEN: &str = "[X]";

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub effective_count: u32,
    pub total_steps: u32,
    pub percent: f32,
    pub remaining: u32,
    pub message: String,
}

/// Summarize `effective_count` filled steps out of `total_steps`.
///
/// Template selection mirrors the storefront reference: complete, one away,
/// two away, then exact counts of 2 and 1, then the generic template.
pub fn summarize(effective_count: u32, total_steps: u32, templates: &[String; 6]) -> Progress {
    let total = total_steps.max(1);
    let remaining = total.saturating_sub(effective_count);

    let template = if effective_count >= total {
        &templates[5]
    } else if effective_count == total - 1 {
        &templates[4]
    } else if effective_count + 2 == total {
        &templates[3]
    } else if effective_count == 2 {
        &templates[2]
    } else if effective_count == 1 {
        &templates[1]
    } else {
        &templates[0]
    };

    Progress {
        effective_count,
        total_steps: total,
        percent: percent(effective_count, total),
        remaining,
        message: template.replace(REMAINING_TOKEN, &remaining.to_string()),
    }
}

pub fn percent(effective_count: u32, total_steps: u32) -> f32 {
    (effective_count as f32 * 100.0 / total_steps.max(1) as f32).min(100.0)
}
