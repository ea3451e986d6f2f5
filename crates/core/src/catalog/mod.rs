//! Card catalog gateways: the only I/O the engine depends on.

pub mod fixed;
pub mod http;
pub mod postgres;

pub use fixed::StaticCatalog;
pub use http::HttpJsonCatalog;
pub use postgres::PgCardCatalog;

use crate::config::Settings;
use crate::domain::contract::CatalogCardRow;
use crate::domain::CardRecord;
use anyhow::Context;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait CardCatalogGateway: Send + Sync {
    fn gateway_name(&self) -> &'static str;

    /// Returns every active card. Implementations repair malformed rows rather
    /// than failing; an error means the backing store could not be read at all.
    async fn fetch_active_cards(&self) -> anyhow::Result<Vec<CardRecord>>;
}

/// The catalog could not be read, so no recommendation can be produced.
#[derive(Debug, Clone)]
pub struct CatalogUnavailable {
    pub gateway: &'static str,
    pub detail: String,
}

impl CatalogUnavailable {
    pub fn from_error(gateway: &'static str, err: &anyhow::Error) -> Self {
        Self {
            gateway,
            detail: format!("{err:#}"),
        }
    }
}

impl fmt::Display for CatalogUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "card catalog unavailable (gateway={}): {}",
            self.gateway, self.detail
        )
    }
}

impl std::error::Error for CatalogUnavailable {}

/// Turns raw catalog rows into card records, skipping inactive rows and rows
/// that are not objects. Repairs are logged, never raised.
pub fn normalize_rows(gateway: &'static str, rows: Vec<Value>) -> Vec<CardRecord> {
    let mut out = Vec::with_capacity(rows.len());
    for (position, raw) in rows.into_iter().enumerate() {
        let row = match CatalogCardRow::from_value(raw) {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(gateway, position, error = %err, "skipping unreadable catalog row");
                continue;
            }
        };

        if !row.is_active() {
            continue;
        }

        let normalized = row.into_card_record(position);
        if !normalized.defaulted.is_empty() {
            tracing::warn!(
                gateway,
                card_id = %normalized.card.id,
                defaulted = ?normalized.defaulted,
                "catalog row needed defaults"
            );
        }
        out.push(normalized.card);
    }
    out
}

/// Picks a gateway from the environment: a catalog file wins, then Postgres,
/// then the HTTP catalog.
pub async fn connect_from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn CardCatalogGateway>> {
    if let Some(path) = settings.catalog_file.as_deref() {
        let catalog = StaticCatalog::from_json_file(path)
            .with_context(|| format!("failed to load CATALOG_FILE={path}"))?;
        return Ok(Arc::new(catalog));
    }

    if let Some(db_url) = settings.database_url.as_deref() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .context("connect DATABASE_URL failed")?;
        crate::storage::migrate(&pool).await?;
        return Ok(Arc::new(PgCardCatalog::new(pool)));
    }

    if settings.catalog_base_url.is_some() {
        return Ok(Arc::new(HttpJsonCatalog::from_settings(settings)?));
    }

    anyhow::bail!("no card catalog configured (set CATALOG_FILE, DATABASE_URL or CATALOG_BASE_URL)")
}
