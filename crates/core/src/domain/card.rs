use super::finite_non_negative;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCurrency {
    Points,
    Miles,
    Cashback,
}

impl RewardCurrency {
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" | "point" => Some(Self::Points),
            "miles" | "mile" => Some(Self::Miles),
            "cashback" | "cash_back" | "cash back" | "cash" => Some(Self::Cashback),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Miles => "miles",
            Self::Cashback => "cashback",
        }
    }
}

/// Credit tier, used both for a card's approval requirement and a user's self-reported tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
    #[default]
    Unknown,
}

impl From<String> for CreditTier {
    fn from(value: String) -> Self {
        Self::parse_loose(&value)
    }
}

impl CreditTier {
    pub fn parse_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Self::Excellent,
            "good" => Self::Good,
            "fair" => Self::Fair,
            "poor" | "bad" => Self::Poor,
            _ => Self::Unknown,
        }
    }

    /// Rough FICO-style stand-in. Unknown tiers sit at the fair boundary so they
    /// are neither rewarded nor penalised by the credit-fit rule.
    pub fn score_proxy(self) -> u16 {
        match self {
            Self::Excellent => 750,
            Self::Good => 700,
            Self::Fair | Self::Unknown => 650,
            Self::Poor => 550,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendCategory {
    Groceries,
    Dining,
    Travel,
    Gas,
    Streaming,
    General,
}

impl SpendCategory {
    pub const ALL: [SpendCategory; 6] = [
        SpendCategory::Groceries,
        SpendCategory::Dining,
        SpendCategory::Travel,
        SpendCategory::Gas,
        SpendCategory::Streaming,
        SpendCategory::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Groceries => "groceries",
            Self::Dining => "dining",
            Self::Travel => "travel",
            Self::Gas => "gas",
            Self::Streaming => "streaming",
            Self::General => "general",
        }
    }
}

/// Earn rates for the categories a card can carry a dedicated rate for.
/// `None` means the card earns its base rate there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRates {
    pub groceries: Option<f64>,
    pub dining: Option<f64>,
    pub travel: Option<f64>,
    pub gas: Option<f64>,
}

/// Monthly spend ceilings for bonus categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCaps {
    pub groceries: Option<f64>,
    pub dining: Option<f64>,
    pub travel: Option<f64>,
    pub gas: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    pub issuer: String,
    pub reward_currency: RewardCurrency,
    pub base_earn_rate: f64,
    #[serde(default)]
    pub category_rates: CategoryRates,
    #[serde(default)]
    pub category_caps: CategoryCaps,
    #[serde(default)]
    pub annual_fee: f64,
    pub nominal_point_value: Option<f64>,
    #[serde(default)]
    pub welcome_bonus: String,
    #[serde(default)]
    pub credit_requirement: CreditTier,
    #[serde(default)]
    pub foreign_transaction_fee: f64,
    pub application_url: Option<String>,
}

impl CardRecord {
    pub fn base_rate(&self) -> f64 {
        finite_non_negative(self.base_earn_rate)
    }

    /// Rate applied to a category; streaming and general always earn the base rate.
    pub fn earn_rate(&self, category: SpendCategory) -> f64 {
        let dedicated = match category {
            SpendCategory::Groceries => self.category_rates.groceries,
            SpendCategory::Dining => self.category_rates.dining,
            SpendCategory::Travel => self.category_rates.travel,
            SpendCategory::Gas => self.category_rates.gas,
            SpendCategory::Streaming | SpendCategory::General => None,
        };

        dedicated
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
            .unwrap_or_else(|| self.base_rate())
    }

    pub fn monthly_cap(&self, category: SpendCategory) -> Option<f64> {
        let cap = match category {
            SpendCategory::Groceries => self.category_caps.groceries,
            SpendCategory::Dining => self.category_caps.dining,
            SpendCategory::Travel => self.category_caps.travel,
            SpendCategory::Gas => self.category_caps.gas,
            SpendCategory::Streaming | SpendCategory::General => None,
        };

        cap.filter(|c| c.is_finite() && *c >= 0.0)
    }

    pub fn has_bonus_rate(&self, category: SpendCategory) -> bool {
        self.earn_rate(category) > self.base_rate()
    }

    pub fn fee(&self) -> f64 {
        finite_non_negative(self.annual_fee)
    }

    pub fn foreign_fee(&self) -> f64 {
        finite_non_negative(self.foreign_transaction_fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardRecord {
        CardRecord {
            id: "c1".to_string(),
            name: "Test Card".to_string(),
            issuer: "Test Bank".to_string(),
            reward_currency: RewardCurrency::Points,
            base_earn_rate: 1.0,
            category_rates: CategoryRates {
                dining: Some(3.0),
                groceries: Some(f64::NAN),
                ..Default::default()
            },
            category_caps: CategoryCaps {
                dining: Some(500.0),
                gas: Some(-1.0),
                ..Default::default()
            },
            annual_fee: -95.0,
            nominal_point_value: None,
            welcome_bonus: String::new(),
            credit_requirement: CreditTier::Good,
            foreign_transaction_fee: 0.0,
            application_url: None,
        }
    }

    #[test]
    fn missing_or_bad_category_rates_fall_back_to_base() {
        let c = card();
        assert_eq!(c.earn_rate(SpendCategory::Dining), 3.0);
        assert_eq!(c.earn_rate(SpendCategory::Groceries), 1.0);
        assert_eq!(c.earn_rate(SpendCategory::Travel), 1.0);
        assert_eq!(c.earn_rate(SpendCategory::Streaming), 1.0);
        assert!(c.has_bonus_rate(SpendCategory::Dining));
        assert!(!c.has_bonus_rate(SpendCategory::General));
    }

    #[test]
    fn negative_values_are_coerced() {
        let c = card();
        assert_eq!(c.fee(), 0.0);
        assert_eq!(c.monthly_cap(SpendCategory::Gas), None);
        assert_eq!(c.monthly_cap(SpendCategory::Dining), Some(500.0));
    }

    #[test]
    fn parses_loose_labels() {
        assert_eq!(RewardCurrency::parse_loose(" Cash Back "), Some(RewardCurrency::Cashback));
        assert_eq!(RewardCurrency::parse_loose("crypto"), None);
        assert_eq!(CreditTier::parse_loose("GOOD"), CreditTier::Good);
        assert_eq!(CreditTier::parse_loose("limited"), CreditTier::Unknown);
    }
}
