use crate::domain::CardRecord;
use anyhow::Context;

/// Inserts or replaces catalog cards in one transaction.
pub async fn upsert_cards_atomic(pool: &sqlx::PgPool, cards: &[CardRecord]) -> anyhow::Result<u64> {
    anyhow::ensure!(!cards.is_empty(), "cards must be non-empty");

    let chunk_size: usize = std::env::var("CARDS_UPSERT_BATCH")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(200);

    anyhow::ensure!(chunk_size >= 1, "CARDS_UPSERT_BATCH must be >= 1");

    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let mut affected: u64 = 0;
    let mut batch_idx: usize = 0;
    for chunk in cards.chunks(chunk_size) {
        batch_idx += 1;
        let t0 = std::time::Instant::now();
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO cards (id, name, issuer, reward_type, base_earn_rate, \
             groceries_earn_rate, dining_earn_rate, travel_earn_rate, gas_earn_rate, \
             groceries_cap, dining_cap, travel_cap, gas_cap, annual_fee, point_value, \
             welcome_bonus, credit_score_required, foreign_transaction_fee, application_url, active) ",
        );
        qb.push_values(chunk, |mut b, card| {
            b.push_bind(card.id.trim())
                .push_bind(card.name.trim())
                .push_bind(card.issuer.trim())
                .push_bind(card.reward_currency.label())
                .push_bind(card.base_earn_rate)
                .push_bind(card.category_rates.groceries)
                .push_bind(card.category_rates.dining)
                .push_bind(card.category_rates.travel)
                .push_bind(card.category_rates.gas)
                .push_bind(card.category_caps.groceries)
                .push_bind(card.category_caps.dining)
                .push_bind(card.category_caps.travel)
                .push_bind(card.category_caps.gas)
                .push_bind(card.annual_fee)
                .push_bind(card.nominal_point_value)
                .push_bind(card.welcome_bonus.as_str())
                .push_bind(card.credit_requirement.label())
                .push_bind(card.foreign_transaction_fee)
                .push_bind(card.application_url.as_deref())
                .push_bind(true);
        });
        qb.push(
            " ON CONFLICT (id) DO UPDATE SET \
               name = EXCLUDED.name, issuer = EXCLUDED.issuer, reward_type = EXCLUDED.reward_type, \
               base_earn_rate = EXCLUDED.base_earn_rate, \
               groceries_earn_rate = EXCLUDED.groceries_earn_rate, dining_earn_rate = EXCLUDED.dining_earn_rate, \
               travel_earn_rate = EXCLUDED.travel_earn_rate, gas_earn_rate = EXCLUDED.gas_earn_rate, \
               groceries_cap = EXCLUDED.groceries_cap, dining_cap = EXCLUDED.dining_cap, \
               travel_cap = EXCLUDED.travel_cap, gas_cap = EXCLUDED.gas_cap, \
               annual_fee = EXCLUDED.annual_fee, point_value = EXCLUDED.point_value, \
               welcome_bonus = EXCLUDED.welcome_bonus, credit_score_required = EXCLUDED.credit_score_required, \
               foreign_transaction_fee = EXCLUDED.foreign_transaction_fee, \
               application_url = EXCLUDED.application_url, active = EXCLUDED.active, updated_at = now()",
        );

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch upsert cards failed")?;
        affected += res.rows_affected();

        tracing::debug!(
            batch_idx,
            batch_size = chunk.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "cards batch upsert"
        );
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(affected)
}

/// Marks every card not in `keep_ids` inactive, so a reseed retires stale rows.
pub async fn deactivate_missing(pool: &sqlx::PgPool, keep_ids: &[String]) -> anyhow::Result<u64> {
    let res = sqlx::query("UPDATE cards SET active = FALSE, updated_at = now() WHERE active AND NOT (id = ANY($1))")
        .persistent(false)
        .bind(keep_ids)
        .execute(pool)
        .await
        .context("deactivate stale cards failed")?;
    Ok(res.rows_affected())
}
