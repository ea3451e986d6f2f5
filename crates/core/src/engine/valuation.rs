//! Reward-currency valuation.
//!
//! Channel values come from a declarative rule table keyed by issuer family and
//! currency kind. Adding an issuer means adding a row to [`VALUATION_RULES`];
//! nothing else in the engine needs to change.

use crate::domain::{
    CardRecord, DynamicPointValue, RedemptionPreference, RewardCurrency, SpendingProfile,
    TravelFrequency,
};

/// Last-resort dollar value per point when a card carries no usable nominal value.
pub const BASELINE_POINT_VALUE: f64 = 0.01;

/// Flexibility assumed for currencies no rule recognises.
const FALLBACK_FLEXIBILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
struct Channels {
    cashback: f64,
    travel: f64,
    transfer: f64,
    statement_credit: f64,
    gift_card: f64,
}

#[derive(Debug, Clone, Copy)]
enum TravelScaling {
    /// Channel values do not depend on the traveller.
    Flat,
    /// Travel and transfer values are multiplied for the most frequent travellers.
    TopTierBoost(f64),
    /// Travel and transfer values are read from the table, indexed by travel frequency.
    ByFrequency([f64; 5]),
}

#[derive(Debug)]
struct ValuationRule {
    /// Lowercase substrings matched against the issuer; empty matches any issuer.
    issuers: &'static [&'static str],
    currency: RewardCurrency,
    channels: Channels,
    scaling: TravelScaling,
    flexibility: f64,
}

// Issuer-specific rows must precede the catch-all rows for the same currency.
static VALUATION_RULES: &[ValuationRule] = &[
    ValuationRule {
        issuers: &["chase"],
        currency: RewardCurrency::Points,
        channels: Channels {
            cashback: 1.0,
            travel: 1.25,
            transfer: 1.8,
            statement_credit: 1.0,
            gift_card: 1.0,
        },
        scaling: TravelScaling::TopTierBoost(1.2),
        flexibility: 0.9,
    },
    ValuationRule {
        issuers: &["american express", "amex"],
        currency: RewardCurrency::Points,
        channels: Channels {
            cashback: 1.0,
            travel: 1.0,
            transfer: 1.85,
            statement_credit: 0.6,
            gift_card: 0.7,
        },
        scaling: TravelScaling::TopTierBoost(1.15),
        flexibility: 0.75,
    },
    ValuationRule {
        issuers: &["citi"],
        currency: RewardCurrency::Points,
        channels: Channels {
            cashback: 1.0,
            travel: 1.0,
            transfer: 1.7,
            statement_credit: 1.0,
            gift_card: 1.0,
        },
        scaling: TravelScaling::TopTierBoost(1.15),
        flexibility: 0.8,
    },
    ValuationRule {
        issuers: &["capital one"],
        currency: RewardCurrency::Miles,
        channels: Channels {
            cashback: 0.5,
            travel: 1.0,
            transfer: 1.7,
            statement_credit: 1.0,
            gift_card: 0.8,
        },
        scaling: TravelScaling::TopTierBoost(1.1),
        flexibility: 0.85,
    },
    ValuationRule {
        issuers: &[],
        currency: RewardCurrency::Cashback,
        channels: Channels {
            cashback: 1.0,
            travel: 1.0,
            transfer: 1.0,
            statement_credit: 1.0,
            gift_card: 1.0,
        },
        scaling: TravelScaling::Flat,
        flexibility: 1.0,
    },
    ValuationRule {
        issuers: &[],
        currency: RewardCurrency::Miles,
        channels: Channels {
            cashback: 0.5,
            travel: 1.0,
            transfer: 1.0,
            statement_credit: 0.5,
            gift_card: 0.6,
        },
        scaling: TravelScaling::ByFrequency([0.8, 1.0, 1.2, 1.5, 1.8]),
        flexibility: 0.6,
    },
];

impl ValuationRule {
    fn matches(&self, card: &CardRecord) -> bool {
        if self.currency != card.reward_currency {
            return false;
        }
        if self.issuers.is_empty() {
            return true;
        }
        let issuer = card.issuer.to_ascii_lowercase();
        self.issuers.iter().any(|pattern| issuer.contains(pattern))
    }

    fn apply(&self, frequency: TravelFrequency) -> DynamicPointValue {
        let Channels {
            cashback,
            mut travel,
            mut transfer,
            statement_credit,
            gift_card,
        } = self.channels;

        match self.scaling {
            TravelScaling::Flat => {}
            TravelScaling::TopTierBoost(factor) => {
                if frequency == TravelFrequency::VeryFrequently {
                    travel *= factor;
                    transfer *= factor;
                }
            }
            TravelScaling::ByFrequency(table) => {
                travel = table[frequency.index()];
                transfer = travel;
            }
        }

        DynamicPointValue {
            cashback,
            travel,
            transfer,
            statement_credit,
            gift_card,
            optimal: travel.max(transfer),
            flexibility: self.flexibility,
        }
    }
}

/// The card's own point value, or the baseline when it is missing or unusable.
pub fn nominal_point_value(card: &CardRecord) -> f64 {
    card.nominal_point_value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(BASELINE_POINT_VALUE)
}

pub fn valuate(card: &CardRecord, profile: &SpendingProfile) -> DynamicPointValue {
    match VALUATION_RULES.iter().find(|rule| rule.matches(card)) {
        Some(rule) => rule.apply(profile.travel_frequency),
        None => {
            let v = nominal_point_value(card);
            DynamicPointValue {
                cashback: v,
                travel: v,
                transfer: v,
                statement_credit: v,
                gift_card: v,
                optimal: v,
                flexibility: FALLBACK_FLEXIBILITY,
            }
        }
    }
}

impl DynamicPointValue {
    /// Picks the single figure matching how the user says they redeem.
    pub fn effective_for(&self, preference: RedemptionPreference) -> f64 {
        match preference {
            RedemptionPreference::Cashback => self.cashback,
            RedemptionPreference::Travel => self.travel,
            RedemptionPreference::MaximumValue => self.optimal,
            RedemptionPreference::Flexible => self.optimal * 0.7 + self.cashback * 0.3,
        }
    }
}

pub(crate) fn effective_from(
    valuation: &DynamicPointValue,
    card: &CardRecord,
    profile: &SpendingProfile,
) -> f64 {
    let v = valuation.effective_for(profile.redemption_preference);
    if v.is_finite() && v > 0.0 {
        v
    } else {
        nominal_point_value(card)
    }
}

/// Always strictly positive.
pub fn effective_point_value(card: &CardRecord, profile: &SpendingProfile) -> f64 {
    effective_from(&valuate(card, profile), card, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{card, profile};

    #[test]
    fn cashback_currency_is_flat_and_fully_flexible() {
        let mut c = card("flat");
        c.issuer = "Chase".to_string();
        c.reward_currency = RewardCurrency::Cashback;
        let v = valuate(&c, &profile());
        for channel in [v.cashback, v.travel, v.transfer, v.statement_credit, v.gift_card, v.optimal] {
            assert_eq!(channel, 1.0);
        }
        assert_eq!(v.flexibility, 1.0);
    }

    #[test]
    fn transferable_points_boost_for_top_tier_travellers() {
        let mut c = card("sapphire");
        c.issuer = "JPMorgan Chase".to_string();
        c.reward_currency = RewardCurrency::Points;

        let mut p = profile();
        p.travel_frequency = TravelFrequency::Occasionally;
        let regular = valuate(&c, &p);
        p.travel_frequency = TravelFrequency::VeryFrequently;
        let boosted = valuate(&c, &p);

        assert_eq!(regular.transfer, 1.8);
        assert!((boosted.transfer - 2.16).abs() < 1e-9);
        assert!((boosted.travel - 1.5).abs() < 1e-9);
        assert_eq!(boosted.optimal, boosted.transfer);
        assert_eq!(regular.cashback, 1.0);
        assert_eq!(regular.flexibility, 0.9);
    }

    #[test]
    fn unnamed_miles_scale_with_travel_frequency() {
        let mut c = card("miles");
        c.issuer = "Regional Credit Union".to_string();
        c.reward_currency = RewardCurrency::Miles;

        let mut p = profile();
        p.travel_frequency = TravelFrequency::Never;
        assert_eq!(valuate(&c, &p).optimal, 0.8);
        p.travel_frequency = TravelFrequency::VeryFrequently;
        let v = valuate(&c, &p);
        assert_eq!(v.optimal, 1.8);
        assert_eq!(v.flexibility, 0.6);
    }

    #[test]
    fn unmatched_points_fall_back_to_nominal_then_baseline() {
        let mut c = card("store");
        c.issuer = "Store Bank".to_string();
        c.reward_currency = RewardCurrency::Points;
        c.nominal_point_value = Some(0.8);
        assert_eq!(valuate(&c, &profile()).optimal, 0.8);

        c.nominal_point_value = Some(f64::NAN);
        let mut p = profile();
        p.redemption_preference = RedemptionPreference::Cashback;
        assert_eq!(effective_point_value(&c, &p), BASELINE_POINT_VALUE);
    }

    #[test]
    fn preference_selects_channel() {
        let v = DynamicPointValue {
            cashback: 1.0,
            travel: 1.25,
            transfer: 2.0,
            statement_credit: 1.0,
            gift_card: 1.0,
            optimal: 2.0,
            flexibility: 0.9,
        };
        assert_eq!(v.effective_for(RedemptionPreference::Cashback), 1.0);
        assert_eq!(v.effective_for(RedemptionPreference::Travel), 1.25);
        assert_eq!(v.effective_for(RedemptionPreference::MaximumValue), 2.0);
        assert!((v.effective_for(RedemptionPreference::Flexible) - 1.7).abs() < 1e-9);
    }

    #[test]
    fn effective_value_is_always_positive() {
        let mut p = profile();
        for currency in [RewardCurrency::Points, RewardCurrency::Miles, RewardCurrency::Cashback] {
            for pref in [
                RedemptionPreference::Cashback,
                RedemptionPreference::Travel,
                RedemptionPreference::Flexible,
                RedemptionPreference::MaximumValue,
            ] {
                let mut c = card("any");
                c.reward_currency = currency;
                c.nominal_point_value = None;
                p.redemption_preference = pref;
                assert!(effective_point_value(&c, &p) > 0.0);
            }
        }
    }
}
