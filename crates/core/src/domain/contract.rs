use crate::domain::card::{CardRecord, CategoryCaps, CategoryRates, CreditTier, RewardCurrency};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_BASE_EARN_RATE: f64 = 1.0;

/// One card as it arrives from a catalog store.
///
/// Every field is kept as a loose JSON value so that a single malformed row
/// (a fee stored as `"$95"`, a missing rate, a null currency) is repaired by
/// [`CatalogCardRow::into_card_record`] instead of failing the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogCardRow {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub issuer: Option<Value>,
    pub reward_type: Option<Value>,
    pub base_earn_rate: Option<Value>,
    pub groceries_earn_rate: Option<Value>,
    pub dining_earn_rate: Option<Value>,
    pub travel_earn_rate: Option<Value>,
    pub gas_earn_rate: Option<Value>,
    pub groceries_cap: Option<Value>,
    pub dining_cap: Option<Value>,
    pub travel_cap: Option<Value>,
    pub gas_cap: Option<Value>,
    pub annual_fee: Option<Value>,
    pub point_value: Option<Value>,
    pub welcome_bonus: Option<Value>,
    pub credit_score_required: Option<Value>,
    pub foreign_transaction_fee: Option<Value>,
    pub application_url: Option<Value>,
    pub active: Option<Value>,
}

/// A row after coercion, with the names of the fields that had to be defaulted.
#[derive(Debug, Clone)]
pub struct NormalizedCard {
    pub card: CardRecord,
    pub defaulted: Vec<&'static str>,
}

impl CatalogCardRow {
    pub fn from_value(v: Value) -> anyhow::Result<Self> {
        anyhow::ensure!(v.is_object(), "catalog row must be a JSON object (got {v})");
        serde_json::from_value(v).context("failed to decode catalog row")
    }

    /// Rows without an explicit `active` flag are treated as active.
    pub fn is_active(&self) -> bool {
        match &self.active {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !matches!(s.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"),
            Some(Value::Number(n)) => n.as_f64().map(|x| x != 0.0).unwrap_or(true),
            _ => true,
        }
    }

    pub fn into_card_record(self, position: usize) -> NormalizedCard {
        let mut defaulted = Vec::new();

        let id = loose_string(self.id.as_ref()).unwrap_or_else(|| {
            defaulted.push("id");
            format!("row-{position}")
        });
        let name = loose_string(self.name.as_ref()).unwrap_or_else(|| {
            defaulted.push("name");
            id.clone()
        });
        let issuer = loose_string(self.issuer.as_ref()).unwrap_or_else(|| {
            defaulted.push("issuer");
            String::new()
        });

        let reward_currency = loose_string(self.reward_type.as_ref())
            .and_then(|s| RewardCurrency::parse_loose(&s))
            .unwrap_or_else(|| {
                defaulted.push("reward_type");
                RewardCurrency::Points
            });

        let base_earn_rate = loose_number(self.base_earn_rate.as_ref()).unwrap_or_else(|| {
            defaulted.push("base_earn_rate");
            DEFAULT_BASE_EARN_RATE
        });

        let annual_fee = loose_number(self.annual_fee.as_ref()).unwrap_or_else(|| {
            if self.annual_fee.as_ref().is_some_and(|v| !v.is_null()) {
                defaulted.push("annual_fee");
            }
            0.0
        });

        let nominal_point_value = loose_number(self.point_value.as_ref()).filter(|v| *v > 0.0);
        if nominal_point_value.is_none() {
            defaulted.push("point_value");
        }

        let foreign_transaction_fee = loose_number(self.foreign_transaction_fee.as_ref())
            .unwrap_or(0.0);

        let card = CardRecord {
            id,
            name,
            issuer,
            reward_currency,
            base_earn_rate,
            category_rates: CategoryRates {
                groceries: loose_number(self.groceries_earn_rate.as_ref()),
                dining: loose_number(self.dining_earn_rate.as_ref()),
                travel: loose_number(self.travel_earn_rate.as_ref()),
                gas: loose_number(self.gas_earn_rate.as_ref()),
            },
            category_caps: CategoryCaps {
                groceries: loose_number(self.groceries_cap.as_ref()),
                dining: loose_number(self.dining_cap.as_ref()),
                travel: loose_number(self.travel_cap.as_ref()),
                gas: loose_number(self.gas_cap.as_ref()),
            },
            annual_fee,
            nominal_point_value,
            welcome_bonus: loose_string(self.welcome_bonus.as_ref()).unwrap_or_default(),
            credit_requirement: loose_string(self.credit_score_required.as_ref())
                .map(|s| CreditTier::parse_loose(&s))
                .unwrap_or_default(),
            foreign_transaction_fee,
            application_url: loose_string(self.application_url.as_ref()),
        };

        NormalizedCard { card, defaulted }
    }
}

/// Accepts numbers and numeric strings such as `"$95"`, `"3%"` or `"1,000"`.
/// Anything negative, non-finite or unparseable becomes `None`.
pub fn loose_number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | '%' | ',' | ' ' | 'x' | 'X'))
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };

    (n.is_finite() && n >= 0.0).then_some(n)
}

fn loose_string(v: Option<&Value>) -> Option<String> {
    let s = match v? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}
