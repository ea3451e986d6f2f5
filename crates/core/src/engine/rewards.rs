use super::valuation;
use crate::domain::{CardRecord, CategoryBreakdownEntry, SpendCategory, SpendingProfile};

/// Annual reward for one category. Spend above the annual cap earns the base
/// rate, never the bonus rate.
pub fn category_reward(
    annual_spend: f64,
    rate: f64,
    base_rate: f64,
    monthly_cap: Option<f64>,
    point_value: f64,
) -> f64 {
    let (capped, overflow) = match monthly_cap {
        Some(cap) => {
            let capped = annual_spend.min(cap * 12.0);
            (capped, annual_spend - capped)
        }
        None => (annual_spend, 0.0),
    };

    let reward = capped * rate * point_value + overflow * base_rate * point_value;
    if reward.is_finite() && reward > 0.0 {
        reward
    } else {
        0.0
    }
}

pub(crate) fn breakdown_with(
    card: &CardRecord,
    profile: &SpendingProfile,
    point_value: f64,
) -> Vec<CategoryBreakdownEntry> {
    let base_rate = card.base_rate();
    SpendCategory::ALL
        .iter()
        .map(|&category| {
            let annual_spend = profile.annual_spend(category);
            let earn_rate = card.earn_rate(category);
            CategoryBreakdownEntry {
                category,
                annual_spend,
                earn_rate,
                reward_value: category_reward(
                    annual_spend,
                    earn_rate,
                    base_rate,
                    card.monthly_cap(category),
                    point_value,
                ),
            }
        })
        .collect()
}

pub fn category_breakdown(card: &CardRecord, profile: &SpendingProfile) -> Vec<CategoryBreakdownEntry> {
    breakdown_with(card, profile, valuation::effective_point_value(card, profile))
}

/// Sum of every category's reward; never negative.
pub fn annual_rewards(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    category_breakdown(card, profile)
        .iter()
        .map(|entry| entry.reward_value)
        .sum()
}
