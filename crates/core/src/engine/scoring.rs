use super::{bonus, rewards, valuation};
use crate::domain::{
    BonusImportance, CardRecord, CreditTier, RewardCurrency, SpendCategory, SpendingProfile,
    TravelFrequency,
};

const CATEGORY_ALIGNMENT_CAP: f64 = 30.0;

/// Individual contributions to a personalization score, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreComponents {
    pub credit_fit: f64,
    pub category_alignment: f64,
    pub travel_alignment: f64,
    pub fee_justification: f64,
    pub bonus_importance: f64,
}

impl ScoreComponents {
    /// Sum of the components, clamped to [0, 100].
    pub fn total(&self) -> f64 {
        let sum = self.credit_fit
            + self.category_alignment
            + self.travel_alignment
            + self.fee_justification
            + self.bonus_importance;
        clamp_score(sum)
    }
}

pub(crate) fn clamp_score(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

fn credit_fit(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    let proxy = profile.credit_proxy();
    let mut score = match card.credit_requirement {
        CreditTier::Excellent if proxy >= 750 => 25.0,
        CreditTier::Good if proxy >= 700 => 20.0,
        CreditTier::Fair if proxy >= 650 => 15.0,
        _ => 0.0,
    };
    if proxy < 650 {
        score -= 10.0;
    }
    score
}

fn category_alignment(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    let total = profile.total_annual_spend();
    if total <= 0.0 {
        return 0.0;
    }

    let base = card.base_rate();
    let sum: f64 = SpendCategory::ALL
        .iter()
        .filter(|c| card.has_bonus_rate(**c))
        .map(|&c| {
            let weight = profile.annual_spend(c) / total;
            weight * (card.earn_rate(c) - base) * 10.0
        })
        .sum();

    sum.min(CATEGORY_ALIGNMENT_CAP)
}

fn travel_alignment(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    if card.reward_currency != RewardCurrency::Miles {
        return 0.0;
    }
    match profile.travel_frequency {
        TravelFrequency::VeryFrequently => 15.0,
        TravelFrequency::Frequently => 10.0,
        TravelFrequency::Occasionally => 5.0,
        TravelFrequency::Rarely => -5.0,
        TravelFrequency::Never => -10.0,
    }
}

fn fee_justification(fee: f64, annual_rewards: f64) -> f64 {
    if fee <= 0.0 {
        return 10.0;
    }
    // Zero rewards give an infinite ratio, which lands in the unjustified bucket.
    let fee_ratio = fee / annual_rewards;
    if fee_ratio < 0.3 {
        15.0
    } else if fee_ratio < 0.5 {
        10.0
    } else if fee_ratio < 0.7 {
        5.0
    } else {
        -10.0
    }
}

fn bonus_importance(importance: BonusImportance, welcome_value: f64) -> f64 {
    match importance {
        BonusImportance::High => (welcome_value / 50.0).min(15.0),
        BonusImportance::Medium => (welcome_value / 100.0).min(8.0),
        BonusImportance::Low => 0.0,
    }
}

pub(crate) fn components_with(
    card: &CardRecord,
    profile: &SpendingProfile,
    annual_rewards: f64,
    welcome_value: f64,
) -> ScoreComponents {
    ScoreComponents {
        credit_fit: credit_fit(card, profile),
        category_alignment: category_alignment(card, profile),
        travel_alignment: travel_alignment(card, profile),
        fee_justification: fee_justification(card.fee(), annual_rewards),
        bonus_importance: bonus_importance(profile.signup_bonus_importance, welcome_value),
    }
}

pub fn score_components(card: &CardRecord, profile: &SpendingProfile) -> ScoreComponents {
    let point_value = valuation::effective_point_value(card, profile);
    let annual_rewards: f64 = rewards::breakdown_with(card, profile, point_value)
        .iter()
        .map(|e| e.reward_value)
        .sum();
    let welcome_value = bonus::welcome_value_with(
        &card.welcome_bonus,
        profile.total_monthly_spend(),
        point_value,
    );
    components_with(card, profile, annual_rewards, welcome_value)
}

/// Personalization score in [0, 100].
pub fn score(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    score_components(card, profile).total()
}
