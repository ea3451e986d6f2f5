use anyhow::Context;
use cardwise_core::catalog::StaticCatalog;
use cardwise_core::config::Settings;

/// Writes the demo catalog to Postgres and retires cards that are no longer in it.
pub async fn run(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    let catalog = StaticCatalog::demo();
    let cards = catalog.cards();
    anyhow::ensure!(!cards.is_empty(), "demo catalog must be non-empty");

    if dry_run {
        for card in cards {
            tracing::info!(
                card_id = %card.id,
                issuer = %card.issuer,
                currency = card.reward_currency.label(),
                annual_fee = card.annual_fee,
                "seed card (dry-run)"
            );
        }
        tracing::info!(dry_run = true, cards = cards.len(), "seed-catalog complete");
        return Ok(());
    }

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    cardwise_core::storage::migrate(&pool).await?;

    let upserted = cardwise_core::storage::cards::upsert_cards_atomic(&pool, cards).await?;
    let keep_ids: Vec<String> = cards.iter().map(|c| c.id.clone()).collect();
    let retired = cardwise_core::storage::cards::deactivate_missing(&pool, &keep_ids).await?;

    tracing::info!(upserted, retired, "seed-catalog complete");
    Ok(())
}
