use super::card::{CardRecord, CreditTier, SpendCategory};
use super::finite_non_negative;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelFrequency {
    Never,
    #[serde(alias = "rare")]
    Rarely,
    #[default]
    #[serde(alias = "occasional")]
    Occasionally,
    #[serde(alias = "frequent")]
    Frequently,
    #[serde(alias = "very_frequent")]
    VeryFrequently,
}

impl TravelFrequency {
    /// Position on the five-level scale, `Never` = 0.
    pub fn index(self) -> usize {
        match self {
            Self::Never => 0,
            Self::Rarely => 1,
            Self::Occasionally => 2,
            Self::Frequently => 3,
            Self::VeryFrequently => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionPreference {
    Cashback,
    Travel,
    #[default]
    Flexible,
    MaximumValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusImportance {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlySpending {
    pub groceries: f64,
    pub dining: f64,
    pub travel: f64,
    pub gas: f64,
    pub streaming: f64,
    pub general: f64,
}

impl MonthlySpending {
    pub fn get(&self, category: SpendCategory) -> f64 {
        let raw = match category {
            SpendCategory::Groceries => self.groceries,
            SpendCategory::Dining => self.dining,
            SpendCategory::Travel => self.travel,
            SpendCategory::Gas => self.gas,
            SpendCategory::Streaming => self.streaming,
            SpendCategory::General => self.general,
        };
        finite_non_negative(raw)
    }

    pub fn total(&self) -> f64 {
        SpendCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn any_positive(&self) -> bool {
        SpendCategory::ALL.iter().any(|c| self.get(*c) > 0.0)
    }
}

/// Everything the engine knows about the person asking for a recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendingProfile {
    pub annual_income: f64,
    pub credit_tier: CreditTier,
    pub monthly_spending: MonthlySpending,
    pub travel_frequency: TravelFrequency,
    pub redemption_preference: RedemptionPreference,
    pub current_cards: Vec<String>,
    pub payment_behavior: String,
    pub signup_bonus_importance: BonusImportance,
}

impl SpendingProfile {
    pub fn annual_spend(&self, category: SpendCategory) -> f64 {
        self.monthly_spending.get(category) * 12.0
    }

    pub fn total_monthly_spend(&self) -> f64 {
        self.monthly_spending.total()
    }

    pub fn total_annual_spend(&self) -> f64 {
        self.total_monthly_spend() * 12.0
    }

    pub fn credit_proxy(&self) -> u16 {
        self.credit_tier.score_proxy()
    }

    /// Matches held cards by id or by name, case-insensitively.
    pub fn holds(&self, card: &CardRecord) -> bool {
        self.current_cards.iter().any(|held| {
            let held = held.trim();
            !held.is_empty()
                && (held.eq_ignore_ascii_case(card.id.trim())
                    || held.eq_ignore_ascii_case(card.name.trim()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_partial_profile_with_defaults() {
        let v = json!({
            "credit_tier": "good",
            "monthly_spending": {"dining": 250.0, "groceries": 400.0},
            "travel_frequency": "occasionally",
            "redemption_preference": "maximum_value"
        });

        let profile: SpendingProfile = serde_json::from_value(v).unwrap();
        assert_eq!(profile.credit_tier, CreditTier::Good);
        assert_eq!(profile.travel_frequency, TravelFrequency::Occasionally);
        assert_eq!(profile.redemption_preference, RedemptionPreference::MaximumValue);
        assert_eq!(profile.signup_bonus_importance, BonusImportance::Medium);
        assert_eq!(profile.total_monthly_spend(), 650.0);
        assert_eq!(profile.annual_spend(SpendCategory::Dining), 3000.0);
    }

    #[test]
    fn unknown_credit_tier_is_not_an_error() {
        let v = json!({ "credit_tier": "platinum" });
        let profile: SpendingProfile = serde_json::from_value(v).unwrap();
        assert_eq!(profile.credit_tier, CreditTier::Unknown);
        assert_eq!(profile.credit_proxy(), 650);
    }

    #[test]
    fn negative_and_non_finite_spend_count_as_zero() {
        let spending = MonthlySpending {
            groceries: -100.0,
            dining: f64::INFINITY,
            general: 50.0,
            ..Default::default()
        };
        assert_eq!(spending.total(), 50.0);
        assert!(spending.any_positive());
        assert!(!MonthlySpending::default().any_positive());
    }
}
