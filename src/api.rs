use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::scrape::types::PriceRecord;
use crate::store::PriceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PriceStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(root))
        .route("/prices", get(latest_prices))
        .route("/prices/history", get(price_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct Banner {
    message: &'static str,
}

async fn root() -> Json<Banner> {
    Json(Banner {
        message: "Agricultural Price Tracker API",
    })
}

/// Latest stored record per commodity.
async fn latest_prices(State(state): State<AppState>) -> Json<Vec<PriceRecord>> {
    Json(state.store.latest())
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    /// Case-insensitive substring of the commodity display name.
    commodity: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Stored records, newest first.
async fn price_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<PriceRecord>> {
    Json(state.store.history(q.commodity.as_deref(), q.limit))
}
