pub mod card;
pub mod contract;
pub mod profile;
pub mod recommendation;

pub use card::{CardRecord, CategoryCaps, CategoryRates, CreditTier, RewardCurrency, SpendCategory};
pub use profile::{
    BonusImportance, MonthlySpending, RedemptionPreference, SpendingProfile, TravelFrequency,
};
pub use recommendation::{CategoryBreakdownEntry, DynamicPointValue, Reasoning, Recommendation};

/// Clamps anything negative, NaN or infinite to zero.
pub(crate) fn finite_non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
