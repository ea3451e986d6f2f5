use super::card::{CardRecord, SpendCategory};
use serde::{Deserialize, Serialize};

/// Dollar-per-point figures for each redemption channel of a card's currency,
/// personalised for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicPointValue {
    pub cashback: f64,
    pub travel: f64,
    pub transfer: f64,
    pub statement_credit: f64,
    pub gift_card: f64,
    pub optimal: f64,
    /// How easily the best-case value is realised, in [0, 1].
    pub flexibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownEntry {
    pub category: SpendCategory,
    pub annual_spend: f64,
    pub earn_rate: f64,
    pub reward_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub primary_benefits: Vec<String>,
    pub drawbacks: Vec<String>,
    pub best_use_cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub card: CardRecord,
    pub annual_reward_value: f64,
    pub net_annual_benefit: f64,
    pub first_year_value: f64,
    pub personalization_score: f64,
    pub ai_confidence_score: f64,
    pub risk_factors: Vec<String>,
    pub optimization_tips: Vec<String>,
    pub category_breakdown: Vec<CategoryBreakdownEntry>,
    pub point_valuation: DynamicPointValue,
    pub reasoning: Reasoning,
}
