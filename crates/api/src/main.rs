use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use cardwise_core::catalog::CardCatalogGateway;
use cardwise_core::domain::{Recommendation, SpendingProfile};
use cardwise_core::RecommendOptions;

const MAX_RESULTS_LIMIT: usize = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = cardwise_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let gateway = match cardwise_core::catalog::connect_from_settings(&settings).await {
        Ok(gateway) => {
            tracing::info!(gateway = gateway.gateway_name(), "card catalog connected");
            Some(gateway)
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "card catalog unavailable; starting API in degraded mode");
            None
        }
    };

    let state = AppState {
        gateway,
        options: RecommendOptions::from_env(),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/recommendations", post(post_recommendations))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    gateway: Option<Arc<dyn CardCatalogGateway>>,
    options: RecommendOptions,
}

#[derive(Debug, Deserialize)]
struct RecommendRequest {
    profile: SpendingProfile,
    max_results: Option<usize>,
    exclude_held_cards: Option<bool>,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    request_id: Uuid,
    generated_at: DateTime<Utc>,
    items: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

impl RecommendResponse {
    fn new(request_id: Uuid, items: Vec<Recommendation>) -> Self {
        Self {
            request_id,
            generated_at: Utc::now(),
            items,
            diagnostic: None,
        }
    }

    fn unavailable(request_id: Uuid, diagnostic: String) -> Self {
        Self {
            diagnostic: Some(diagnostic),
            ..Self::new(request_id, Vec::new())
        }
    }
}

async fn post_recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> (StatusCode, Json<RecommendResponse>) {
    let request_id = Uuid::new_v4();

    let Some(gateway) = &state.gateway else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(RecommendResponse::unavailable(
                request_id,
                "no card catalog configured".to_string(),
            )),
        );
    };

    let mut opts = state.options.clone();
    if let Some(n) = req.max_results {
        opts.max_results = n.min(MAX_RESULTS_LIMIT);
    }
    if let Some(exclude) = req.exclude_held_cards {
        opts.exclude_held_cards = exclude;
    }

    match cardwise_core::recommend(gateway.as_ref(), &req.profile, &opts).await {
        Ok(items) => {
            tracing::info!(%request_id, returned = items.len(), "recommendations served");
            (StatusCode::OK, Json(RecommendResponse::new(request_id, items)))
        }
        Err(err) => {
            let diagnostic = err.to_string();
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
            tracing::error!(%request_id, error = %diagnostic, "recommendation run failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(RecommendResponse::unavailable(request_id, diagnostic)),
            )
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &cardwise_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use cardwise_core::catalog::StaticCatalog;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(gateway: Option<Arc<dyn CardCatalogGateway>>) -> AppState {
        AppState {
            gateway,
            options: RecommendOptions::default(),
        }
    }

    async fn post(app: Router, body: Value) -> (StatusCode, Value) {
        let res = app
            .oneshot(
                Request::post("/recommendations")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn serves_ranked_items() {
        let app = app(state(Some(Arc::new(StaticCatalog::demo()))));
        let (status, body) = post(
            app,
            json!({
                "profile": {
                    "credit_tier": "good",
                    "monthly_spending": {"dining": 400.0, "general": 1000.0}
                },
                "max_results": 3
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 3);
        assert!(body.get("diagnostic").is_none());
    }

    #[tokio::test]
    async fn degraded_mode_returns_empty_set_with_diagnostic() {
        let app = app(state(None));
        let (status, body) = post(app, json!({"profile": {}})).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["items"].as_array().unwrap().is_empty());
        assert_eq!(body["diagnostic"], "no card catalog configured");
    }
}
