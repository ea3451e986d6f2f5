use super::{normalize_rows, CardCatalogGateway};
use crate::domain::CardRecord;
use anyhow::Context;
use serde_json::Value;

const GATEWAY_NAME: &str = "postgres";

/// Reads active cards from the `cards` table.
///
/// Rows are fetched as `to_jsonb(...)` so that schema drift (a renamed or
/// retyped column) degrades into per-field defaults instead of a decode error.
#[derive(Debug, Clone)]
pub struct PgCardCatalog {
    pool: sqlx::PgPool,
}

impl PgCardCatalog {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl CardCatalogGateway for PgCardCatalog {
    fn gateway_name(&self) -> &'static str {
        GATEWAY_NAME
    }

    async fn fetch_active_cards(&self) -> anyhow::Result<Vec<CardRecord>> {
        let t0 = std::time::Instant::now();
        let rows: Vec<Value> = sqlx::query_scalar(
            "SELECT to_jsonb(c) FROM cards c \
             WHERE c.active \
             ORDER BY c.id ASC",
        )
        .persistent(false)
        .fetch_all(&self.pool)
        .await
        .context("select active cards failed")?;

        tracing::debug!(
            rows = rows.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "fetched active cards"
        );

        Ok(normalize_rows(GATEWAY_NAME, rows))
    }
}
