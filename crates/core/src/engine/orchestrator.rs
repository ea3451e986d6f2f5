use super::advice::{self, CardFigures};
use super::scoring;
use crate::catalog::{CardCatalogGateway, CatalogUnavailable};
use crate::domain::{
    CardRecord, CategoryBreakdownEntry, Reasoning, Recommendation, SpendingProfile,
};
use std::cmp::Ordering;
use std::time::Duration;

const DEFAULT_MAX_RESULTS: usize = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub max_results: usize,

    /// Drop catalog cards the profile already holds.
    pub exclude_held_cards: bool,

    /// Upper bound on the catalog fetch; the only cancellation point of a run.
    pub fetch_timeout: Duration,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            exclude_held_cards: false,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl RecommendOptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("RECOMMEND_MAX_RESULTS") {
            if let Ok(n) = s.parse::<usize>() {
                out.max_results = n;
            }
        }

        if let Ok(s) = std::env::var("CATALOG_FETCH_TIMEOUT_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                out.fetch_timeout = Duration::from_secs(n);
            }
        }

        out
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn ai_confidence(score: f64, profile: &SpendingProfile, flexibility: f64) -> f64 {
    let mut confidence: f64 = 70.0;
    if score > 50.0 {
        confidence += 15.0;
    }
    if profile.monthly_spending.any_positive() {
        confidence += 10.0;
    }
    if flexibility > 0.7 {
        confidence += 5.0;
    }
    scoring::clamp_score(confidence)
}

fn reasoning(card: &CardRecord, figures: &CardFigures) -> Reasoning {
    let mut primary_benefits = Vec::new();
    let mut drawbacks = Vec::new();

    if card.fee() == 0.0 {
        primary_benefits.push("No annual fee".to_string());
    }
    if figures.valuation.optimal > 1.5 {
        primary_benefits.push("High optimal point value".to_string());
    }

    if card.fee() > 200.0 {
        drawbacks.push("High annual fee".to_string());
    }
    if figures.valuation.flexibility < 0.7 {
        drawbacks.push("Requires redemption expertise".to_string());
    }

    let mut bonus_categories: Vec<&CategoryBreakdownEntry> = figures
        .breakdown
        .iter()
        .filter(|e| card.has_bonus_rate(e.category))
        .collect();
    // Highest rate first; ties keep category order.
    bonus_categories.sort_by(|a, b| b.earn_rate.partial_cmp(&a.earn_rate).unwrap_or(Ordering::Equal));
    let best_use_cases = bonus_categories
        .into_iter()
        .take(2)
        .map(|e| e.category.label().to_string())
        .collect();

    Reasoning {
        primary_benefits,
        drawbacks,
        best_use_cases,
    }
}

/// Values, scores and explains one card for one profile. Never fails: bad card
/// data degrades to zero-valued figures.
pub fn evaluate_card(card: &CardRecord, profile: &SpendingProfile) -> Recommendation {
    let figures = CardFigures::compute(card, profile);

    let annual_rewards = finite_or_zero(figures.annual_rewards);
    let welcome_value = finite_or_zero(figures.welcome_value);
    let fee = card.fee();

    let score = scoring::components_with(card, profile, annual_rewards, welcome_value).total();
    let confidence = ai_confidence(score, profile, figures.valuation.flexibility);

    let recommendation = Recommendation {
        card: card.clone(),
        annual_reward_value: annual_rewards,
        net_annual_benefit: finite_or_zero(annual_rewards - fee),
        first_year_value: finite_or_zero(annual_rewards + welcome_value - fee),
        personalization_score: score,
        ai_confidence_score: confidence,
        risk_factors: advice::risks_with(card, profile, &figures),
        optimization_tips: advice::tips_with(card, profile, &figures),
        reasoning: reasoning(card, &figures),
        category_breakdown: figures.breakdown,
        point_valuation: figures.valuation,
    };

    tracing::debug!(
        card_id = %card.id,
        score,
        annual_rewards,
        net = recommendation.net_annual_benefit,
        "scored card"
    );

    recommendation
}

/// Score weighted against net benefit, expressed in tens of dollars.
pub fn ranking_key(rec: &Recommendation) -> f64 {
    finite_or_zero(rec.personalization_score * 0.6 + (rec.net_annual_benefit / 10.0) * 0.4)
}

/// Pure scoring stage: no I/O, deterministic for identical inputs.
pub fn rank_cards(
    profile: &SpendingProfile,
    cards: &[CardRecord],
    opts: &RecommendOptions,
) -> Vec<Recommendation> {
    let mut scored: Vec<(f64, Recommendation)> = cards
        .iter()
        .filter(|card| !(opts.exclude_held_cards && profile.holds(card)))
        .map(|card| {
            let rec = evaluate_card(card, profile);
            (ranking_key(&rec), rec)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.card.id.cmp(&b.1.card.id))
    });

    scored
        .into_iter()
        .take(opts.max_results)
        .map(|(_, rec)| rec)
        .collect()
}

/// Fetches the active catalog, then ranks it for the profile.
pub async fn recommend(
    gateway: &dyn CardCatalogGateway,
    profile: &SpendingProfile,
    opts: &RecommendOptions,
) -> Result<Vec<Recommendation>, CatalogUnavailable> {
    let gateway_name = gateway.gateway_name();

    let cards = match tokio::time::timeout(opts.fetch_timeout, gateway.fetch_active_cards()).await {
        Ok(Ok(cards)) => cards,
        Ok(Err(err)) => {
            tracing::warn!(gateway = gateway_name, error = %err, "catalog fetch failed");
            return Err(CatalogUnavailable::from_error(gateway_name, &err));
        }
        Err(_) => {
            tracing::warn!(gateway = gateway_name, timeout = ?opts.fetch_timeout, "catalog fetch timed out");
            return Err(CatalogUnavailable {
                gateway: gateway_name,
                detail: format!("timed out after {:?}", opts.fetch_timeout),
            });
        }
    };

    let out = rank_cards(profile, &cards, opts);

    tracing::info!(
        gateway = gateway_name,
        catalog_len = cards.len(),
        returned = out.len(),
        "recommendation run complete"
    );

    Ok(out)
}
