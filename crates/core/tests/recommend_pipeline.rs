use cardwise_core::catalog::{CardCatalogGateway, StaticCatalog};
use cardwise_core::domain::{
    BonusImportance, CardRecord, CreditTier, MonthlySpending, RedemptionPreference,
    SpendingProfile, TravelFrequency,
};
use cardwise_core::{recommend, RecommendOptions};
use std::time::Duration;

struct DownCatalog;

#[async_trait::async_trait]
impl CardCatalogGateway for DownCatalog {
    fn gateway_name(&self) -> &'static str {
        "down"
    }

    async fn fetch_active_cards(&self) -> anyhow::Result<Vec<CardRecord>> {
        anyhow::bail!("connection refused")
    }
}

struct SlowCatalog;

#[async_trait::async_trait]
impl CardCatalogGateway for SlowCatalog {
    fn gateway_name(&self) -> &'static str {
        "slow"
    }

    async fn fetch_active_cards(&self) -> anyhow::Result<Vec<CardRecord>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
}

fn traveller() -> SpendingProfile {
    SpendingProfile {
        annual_income: 120_000.0,
        credit_tier: CreditTier::Good,
        monthly_spending: MonthlySpending {
            groceries: 600.0,
            dining: 400.0,
            travel: 300.0,
            gas: 150.0,
            streaming: 50.0,
            general: 1000.0,
        },
        travel_frequency: TravelFrequency::Occasionally,
        redemption_preference: RedemptionPreference::Flexible,
        current_cards: vec![],
        payment_behavior: "pay_in_full".to_string(),
        signup_bonus_importance: BonusImportance::High,
    }
}

#[tokio::test]
async fn ranks_demo_catalog_best_first() {
    let catalog = StaticCatalog::demo();
    let opts = RecommendOptions::default();

    let out = recommend(&catalog, &traveller(), &opts).await.unwrap();
    assert_eq!(out.len(), 5);

    let keys: Vec<f64> = out.iter().map(cardwise_core::engine::ranking_key).collect();
    assert!(keys.windows(2).all(|w| w[0] >= w[1]), "{keys:?}");

    for rec in &out {
        assert!((0.0..=100.0).contains(&rec.personalization_score));
        assert!((0.0..=100.0).contains(&rec.ai_confidence_score));
        assert!(rec.annual_reward_value.is_finite());
        assert!(rec.first_year_value.is_finite());
        assert_eq!(rec.category_breakdown.len(), 6);
    }
}

#[tokio::test]
async fn identical_inputs_give_identical_output() {
    let catalog = StaticCatalog::demo();
    let opts = RecommendOptions {
        max_results: 10,
        ..Default::default()
    };

    let a = recommend(&catalog, &traveller(), &opts).await.unwrap();
    let b = recommend(&catalog, &traveller(), &opts).await.unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[tokio::test]
async fn foreign_fee_card_warns_occasional_traveller() {
    let catalog = StaticCatalog::demo();
    let opts = RecommendOptions {
        max_results: 10,
        ..Default::default()
    };

    let out = recommend(&catalog, &traveller(), &opts).await.unwrap();
    let double_cash = out
        .iter()
        .find(|r| r.card.id == "citi-double-cash")
        .expect("demo card present");
    assert!(double_cash.risk_factors.iter().any(|r| r.contains("3%")));
}

#[tokio::test]
async fn all_zero_spending_still_orders_every_card() {
    let catalog = StaticCatalog::demo();
    let opts = RecommendOptions {
        max_results: 10,
        ..Default::default()
    };
    let profile = SpendingProfile {
        credit_tier: CreditTier::Good,
        ..Default::default()
    };

    let out = recommend(&catalog, &profile, &opts).await.unwrap();
    assert_eq!(out.len(), catalog.cards().len());
    for rec in &out {
        assert_eq!(rec.annual_reward_value, 0.0);
        assert_eq!(rec.net_annual_benefit, -rec.card.annual_fee);
    }
}

#[tokio::test]
async fn gateway_failure_is_catalog_unavailable() {
    let err = recommend(&DownCatalog, &traveller(), &RecommendOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.gateway, "down");
    assert!(err.detail.contains("connection refused"));
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let opts = RecommendOptions {
        fetch_timeout: Duration::from_millis(20),
        ..Default::default()
    };
    let err = recommend(&SlowCatalog, &traveller(), &opts).await.unwrap_err();
    assert_eq!(err.gateway, "slow");
    assert!(err.detail.contains("timed out"));
}
