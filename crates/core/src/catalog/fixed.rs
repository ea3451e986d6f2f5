use super::{normalize_rows, CardCatalogGateway};
use crate::domain::CardRecord;
use anyhow::Context;
use serde_json::{json, Value};
use std::path::Path;

const GATEWAY_NAME: &str = "static";

/// An in-memory catalog, loaded once. Useful for tests, demos and file-based deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    cards: Vec<CardRecord>,
}

impl StaticCatalog {
    pub fn from_cards(cards: Vec<CardRecord>) -> Self {
        Self { cards }
    }

    pub fn from_rows(rows: Vec<Value>) -> Self {
        Self {
            cards: normalize_rows(GATEWAY_NAME, rows),
        }
    }

    /// Accepts either a bare JSON array of rows or `{ "cards": [...] }`.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let v: Value = serde_json::from_str(text).context("catalog file is not valid JSON")?;
        let rows = match v {
            Value::Array(rows) => rows,
            Value::Object(mut obj) => match obj.remove("cards") {
                Some(Value::Array(rows)) => rows,
                _ => anyhow::bail!("catalog object must contain a \"cards\" array"),
            },
            other => anyhow::bail!("unexpected catalog JSON: {other}"),
        };
        Ok(Self::from_rows(rows))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// A small deterministic catalog covering each currency kind.
    pub fn demo() -> Self {
        Self::from_rows(demo_rows())
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }
}

#[async_trait::async_trait]
impl CardCatalogGateway for StaticCatalog {
    fn gateway_name(&self) -> &'static str {
        GATEWAY_NAME
    }

    async fn fetch_active_cards(&self) -> anyhow::Result<Vec<CardRecord>> {
        Ok(self.cards.clone())
    }
}

pub fn demo_rows() -> Vec<Value> {
    vec![
        json!({
            "id": "chase-sapphire-preferred",
            "name": "Sapphire Preferred",
            "issuer": "Chase",
            "reward_type": "points",
            "base_earn_rate": 1,
            "dining_earn_rate": 3,
            "travel_earn_rate": 2,
            "annual_fee": 95,
            "point_value": 1.25,
            "welcome_bonus": "60,000 points after $4,000 spend in 3 months",
            "credit_score_required": "good",
            "foreign_transaction_fee": 0,
            "application_url": "https://example.com/apply/sapphire-preferred"
        }),
        json!({
            "id": "amex-gold",
            "name": "Gold Card",
            "issuer": "American Express",
            "reward_type": "points",
            "base_earn_rate": 1,
            "groceries_earn_rate": 4,
            "dining_earn_rate": 4,
            "groceries_cap": 2083,
            "annual_fee": 325,
            "point_value": 1.0,
            "welcome_bonus": "60,000 points after $6,000 spend in 6 months",
            "credit_score_required": "excellent",
            "foreign_transaction_fee": 0,
            "application_url": "https://example.com/apply/amex-gold"
        }),
        json!({
            "id": "citi-double-cash",
            "name": "Double Cash",
            "issuer": "Citi",
            "reward_type": "cashback",
            "base_earn_rate": 2,
            "annual_fee": 0,
            "point_value": 1.0,
            "welcome_bonus": "$200 cash back after $1,500 in purchases",
            "credit_score_required": "good",
            "foreign_transaction_fee": 3,
            "application_url": "https://example.com/apply/double-cash"
        }),
        json!({
            "id": "capital-one-venture",
            "name": "Venture Rewards",
            "issuer": "Capital One",
            "reward_type": "miles",
            "base_earn_rate": 2,
            "travel_earn_rate": 5,
            "annual_fee": 95,
            "point_value": 1.0,
            "welcome_bonus": "75,000 miles after $4,000 spend",
            "credit_score_required": "good",
            "foreign_transaction_fee": 0,
            "application_url": "https://example.com/apply/venture"
        }),
        json!({
            "id": "discover-it",
            "name": "Discover it Cash Back",
            "issuer": "Discover",
            "reward_type": "cashback",
            "base_earn_rate": 1,
            "gas_earn_rate": 5,
            "gas_cap": 125,
            "annual_fee": 0,
            "point_value": 1.0,
            "welcome_bonus": "100% cashback match up to $300",
            "credit_score_required": "fair",
            "foreign_transaction_fee": 0,
            "application_url": "https://example.com/apply/discover-it"
        }),
        json!({
            "id": "regional-skymiles",
            "name": "Regional SkyMiles",
            "issuer": "Regional Bank",
            "reward_type": "miles",
            "base_earn_rate": 1,
            "travel_earn_rate": 3,
            "annual_fee": 150,
            "point_value": 1.1,
            "welcome_bonus": "40,000 bonus miles after $2,000 spend",
            "credit_score_required": "good",
            "foreign_transaction_fee": 3,
            "application_url": "https://example.com/apply/skymiles"
        }),
    ]
}
