use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::db::{Database, Stats, StoredSlip};
use crate::error::SlipError;
use crate::models::{CorrelationWarning, Prop};
use crate::slip::{
    analyze_profile, analyze_slip, detect_correlations, RiskProfile, SlipAnalysis, PROFILES,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Bankroll used when a request does not name one
    pub bankroll: f64,
    pub kelly_multiplier: f64,
}

type ApiError = (StatusCode, String);

fn bad_request(e: SlipError) -> ApiError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal(e: anyhow::Error) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Build the Axum router for the slip API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/profiles", get(profiles_handler))
        .route("/api/slips", get(slips_handler))
        .route("/api/slips/generate", post(generate_handler))
        .route("/api/slips/price", post(price_handler))
        .route("/api/correlations", post(correlations_handler))
        .route("/api/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub props: Vec<Prop>,
    pub bankroll: Option<f64>,
    pub kelly_multiplier: Option<f64>,
    /// One canonical profile; all three when absent
    pub profile: Option<String>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub legs: Vec<Prop>,
    pub bankroll: Option<f64>,
    pub kelly_multiplier: Option<f64>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Deserialize)]
pub struct CorrelationRequest {
    pub props: Vec<Prop>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub slips: Vec<SlipAnalysis>,
    pub saved_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    #[serde(flatten)]
    pub analysis: SlipAnalysis,
    pub saved_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationResponse {
    pub warnings: Vec<CorrelationWarning>,
}

/// GET /api/profiles
async fn profiles_handler() -> Json<Vec<RiskProfile>> {
    Json(PROFILES.to_vec())
}

/// GET /api/slips?limit=50&offset=0
async fn slips_handler(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<StoredSlip>>, ApiError> {
    state
        .db
        .list_slips(page.limit.clamp(1, 500), page.offset.max(0))
        .map(Json)
        .map_err(internal)
}

/// POST /api/slips/generate
async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let bankroll = req.bankroll.unwrap_or(state.bankroll);
    let kelly = req.kelly_multiplier.unwrap_or(state.kelly_multiplier);
    let profiles: Vec<&RiskProfile> = match req.profile.as_deref() {
        Some(name) => vec![RiskProfile::by_name(name).map_err(bad_request)?],
        None => PROFILES.iter().collect(),
    };

    let mut slips = Vec::new();
    for profile in profiles {
        if let Some(analysis) =
            analyze_profile(&req.props, profile, bankroll, kelly).map_err(bad_request)?
        {
            slips.push(analysis);
        }
    }

    let mut saved_ids = Vec::new();
    if req.save {
        for analysis in &slips {
            saved_ids.push(
                state
                    .db
                    .insert_slip(&analysis.slip, bankroll)
                    .map_err(internal)?,
            );
        }
    }
    info!(
        "Generated {} slip(s) from {} props{}",
        slips.len(),
        req.props.len(),
        if req.save { " (saved)" } else { "" }
    );
    Ok(Json(GenerateResponse { slips, saved_ids }))
}

/// POST /api/slips/price
async fn price_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PriceRequest>,
) -> Result<Json<PriceResponse>, ApiError> {
    let bankroll = req.bankroll.unwrap_or(state.bankroll);
    let kelly = req.kelly_multiplier.unwrap_or(state.kelly_multiplier);
    let analysis = analyze_slip(&req.legs, bankroll, kelly).map_err(bad_request)?;
    let saved_id = if req.save {
        Some(
            state
                .db
                .insert_slip(&analysis.slip, bankroll)
                .map_err(internal)?,
        )
    } else {
        None
    };
    Ok(Json(PriceResponse { analysis, saved_id }))
}

/// POST /api/correlations
async fn correlations_handler(Json(req): Json<CorrelationRequest>) -> Json<CorrelationResponse> {
    Json(CorrelationResponse {
        warnings: detect_correlations(&req.props),
    })
}

/// GET /api/stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, ApiError> {
    state.db.get_stats().map(Json).map_err(internal)
}
