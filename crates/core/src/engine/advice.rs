use super::{bonus, rewards, valuation};
use crate::domain::{
    CardRecord, CategoryBreakdownEntry, CreditTier, DynamicPointValue, SpendCategory, SpendingProfile,
    TravelFrequency,
};

/// Precomputed figures shared by the risk and tip rules for one card.
#[derive(Debug, Clone)]
pub(crate) struct CardFigures {
    pub breakdown: Vec<CategoryBreakdownEntry>,
    pub annual_rewards: f64,
    pub welcome_value: f64,
    pub valuation: DynamicPointValue,
}

impl CardFigures {
    pub(crate) fn compute(card: &CardRecord, profile: &SpendingProfile) -> Self {
        let valuation = valuation::valuate(card, profile);
        let point_value = valuation::effective_from(&valuation, card, profile);
        let breakdown = rewards::breakdown_with(card, profile, point_value);
        let annual_rewards = breakdown.iter().map(|e| e.reward_value).sum();
        let welcome_value = bonus::welcome_value_with(
            &card.welcome_bonus,
            profile.total_monthly_spend(),
            point_value,
        );
        Self {
            breakdown,
            annual_rewards,
            welcome_value,
            valuation,
        }
    }
}

pub(crate) fn risks_with(card: &CardRecord, profile: &SpendingProfile, figures: &CardFigures) -> Vec<String> {
    let mut out = Vec::new();
    let fee = card.fee();

    if fee > 300.0 && figures.annual_rewards < fee * 1.5 {
        out.push(format!(
            "High annual fee of ${fee:.0} may not be justified by your projected rewards"
        ));
    }

    let foreign_fee = card.foreign_fee();
    if foreign_fee > 0.0 && profile.travel_frequency != TravelFrequency::Never {
        out.push(format!(
            "{}% foreign transaction fee applies to purchases abroad",
            format_percent(foreign_fee)
        ));
    }

    if card.credit_requirement == CreditTier::Excellent && profile.credit_proxy() < 750 {
        out.push("Requires excellent credit; approval is unlikely with your current credit tier".to_string());
    }

    if figures.valuation.flexibility < 0.7 {
        out.push("Requires redemption expertise to get full value from points".to_string());
    }

    for category in SpendCategory::ALL {
        if let Some(cap) = card.monthly_cap(category) {
            let annual_cap = cap * 12.0;
            if profile.annual_spend(category) > annual_cap {
                out.push(format!(
                    "Your {} spending exceeds the bonus cap of ${annual_cap:.0} per year",
                    category.label()
                ));
            }
        }
    }

    out
}

pub(crate) fn tips_with(card: &CardRecord, profile: &SpendingProfile, figures: &CardFigures) -> Vec<String> {
    let mut out = Vec::new();
    let v = &figures.valuation;

    if v.transfer > v.cashback * 1.5 {
        out.push(format!(
            "Transfer points to airline and hotel partners for up to {:.2} per point",
            v.transfer
        ));
    }

    for category in SpendCategory::ALL {
        if card.has_bonus_rate(category) && profile.annual_spend(category) > 2000.0 {
            out.push(format!(
                "Put your {} spending on this card to earn {}x",
                category.label(),
                format_rate(card.earn_rate(category))
            ));
        }
    }

    if figures.welcome_value > 500.0 {
        out.push("Time large purchases to meet the welcome bonus spending requirement".to_string());
    }

    let fee = card.fee();
    if fee > 0.0 {
        let payback_months = (fee / (figures.annual_rewards / 12.0)).ceil();
        if payback_months.is_finite() {
            out.push(format!(
                "The annual fee pays for itself after about {payback_months:.0} months of rewards"
            ));
        }
    }

    out
}

pub fn risks(card: &CardRecord, profile: &SpendingProfile) -> Vec<String> {
    risks_with(card, profile, &CardFigures::compute(card, profile))
}

pub fn tips(card: &CardRecord, profile: &SpendingProfile) -> Vec<String> {
    tips_with(card, profile, &CardFigures::compute(card, profile))
}

fn format_percent(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn format_rate(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
