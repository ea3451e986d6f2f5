//! The recommendation engine: per-card valuation, scoring and explanation,
//! composed and ranked by [`orchestrator`]. Everything here except
//! [`orchestrator::recommend`] is pure and synchronous.

pub mod advice;
pub mod bonus;
pub mod orchestrator;
pub mod rewards;
pub mod scoring;
pub mod valuation;

pub use advice::{risks, tips};
pub use bonus::{parse_bonus, welcome_value, BonusTerms};
pub use orchestrator::{evaluate_card, rank_cards, ranking_key, recommend, RecommendOptions};
pub use rewards::{annual_rewards, category_breakdown};
pub use scoring::{score, ScoreComponents};
pub use valuation::{effective_point_value, valuate};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{
        BonusImportance, CardRecord, CreditTier, RedemptionPreference, RewardCurrency,
        SpendingProfile, TravelFrequency,
    };

    /// A no-fee 1x cashback card requiring good credit.
    pub fn card(id: &str) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            name: format!("Card Name {id}"),
            issuer: "Test Bank".to_string(),
            reward_currency: RewardCurrency::Cashback,
            base_earn_rate: 1.0,
            category_rates: Default::default(),
            category_caps: Default::default(),
            annual_fee: 0.0,
            nominal_point_value: Some(1.0),
            welcome_bonus: String::new(),
            credit_requirement: CreditTier::Good,
            foreign_transaction_fee: 0.0,
            application_url: None,
        }
    }

    /// Good credit, no spending, occasional traveller, flexible redemption.
    pub fn profile() -> SpendingProfile {
        SpendingProfile {
            annual_income: 85_000.0,
            credit_tier: CreditTier::Good,
            travel_frequency: TravelFrequency::Occasionally,
            redemption_preference: RedemptionPreference::Flexible,
            signup_bonus_importance: BonusImportance::Low,
            ..Default::default()
        }
    }
}
