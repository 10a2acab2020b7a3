use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use slotline_core::{random_seed_hex, spin_gated, ProvablyFairRng, WinGate};
use slotline_shared::{
    RotateSeedResponse, SpinRequest, SpinResponse, TransactionEntry, TransactionRequest,
    VerifyResponse, WinPercentage,
};

use crate::db::{self, NewSpin};
use crate::error::{AppError, AppResult};

const MAX_CLIENT_SEED_LEN: usize = 128;
const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 1000;

pub struct AppState {
    pub db: SqlitePool,
    pub api_key: String,
}

type Admin = Option<TypedHeader<Authorization<Bearer>>>;

fn authorize(state: &AppState, header: Admin) -> AppResult<()> {
    match header {
        Some(TypedHeader(Authorization(bearer))) if bearer.token() == state.api_key => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

async fn route_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn route_verify(State(state): State<Arc<AppState>>) -> AppResult<Json<VerifyResponse>> {
    let p = db::get_params(&state.db).await?;
    Ok(Json(VerifyResponse {
        server_seed_hash: p.server_seed_hash,
    }))
}

async fn route_spin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpinRequest>,
) -> AppResult<Json<SpinResponse>> {
    if !req.bet.is_finite() || req.bet <= 0.0 {
        return Err(AppError::Invalid("bet must be a positive number".into()));
    }
    if req.client_seed.is_empty() || req.client_seed.len() > MAX_CLIENT_SEED_LEN {
        return Err(AppError::Invalid(format!(
            "client_seed must be 1..={MAX_CLIENT_SEED_LEN} bytes"
        )));
    }
    let config = req.variant.machine();

    let mut tx = state.db.begin().await?;
    let p = db::next_spin_params(&mut tx).await?;
    let gate = WinGate::new(p.win_percentage)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored win percentage: {e}")))?;
    let rng = ProvablyFairRng::new(&p.server_seed, &req.client_seed, p.nonce as u64);
    let outcome = spin_gated(&config, req.bet, gate, &mut rng.stream())?;

    let reels = outcome.grid.to_rows();
    db::insert_spin(
        &mut tx,
        &NewSpin {
            variant: req.variant,
            client_seed: &req.client_seed,
            nonce: p.nonce,
            server_seed_hash: &p.server_seed_hash,
            win_percentage: p.win_percentage,
            reels: &reels,
            bet: req.bet,
            payout: outcome.winnings,
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        nonce = p.nonce,
        variant = req.variant.as_str(),
        bet = req.bet,
        winnings = outcome.winnings,
        held_back = outcome.held_back,
        "spin"
    );
    Ok(Json(SpinResponse::from_outcome(
        p.server_seed_hash,
        p.nonce as u64,
        p.win_percentage,
        outcome,
    )))
}

async fn route_get_win_percentage(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<WinPercentage>> {
    let p = db::get_params(&state.db).await?;
    Ok(Json(WinPercentage {
        win_percentage: p.win_percentage,
    }))
}

async fn route_admin_set_win_percentage(
    State(state): State<Arc<AppState>>,
    admin: Admin,
    Json(req): Json<WinPercentage>,
) -> AppResult<StatusCode> {
    authorize(&state, admin)?;
    let gate = WinGate::new(req.win_percentage)?;
    db::set_win_percentage(&state.db, gate.win_percentage()).await?;
    info!(win_percentage = gate.win_percentage(), "win percentage updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn route_admin_rotate_seed(
    State(state): State<Arc<AppState>>,
    admin: Admin,
) -> AppResult<Json<RotateSeedResponse>> {
    authorize(&state, admin)?;
    let (previous_server_seed, server_seed_hash) =
        db::rotate_seed(&state.db, &random_seed_hex()).await?;
    info!(%server_seed_hash, "server seed rotated");
    Ok(Json(RotateSeedResponse {
        previous_server_seed,
        server_seed_hash,
    }))
}

async fn route_log_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactionRequest>,
) -> AppResult<(StatusCode, Json<TransactionEntry>)> {
    let player = req.player.trim();
    if player.is_empty() {
        return Err(AppError::Invalid("player must not be empty".into()));
    }
    if !req.amount.is_finite() {
        return Err(AppError::Invalid("amount must be a finite number".into()));
    }
    let entry =
        db::append_transaction(&state.db, player, req.amount, req.reference.as_deref()).await?;
    info!(id = entry.id, player = %entry.player, amount = entry.amount, "transaction logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<i64>,
}

async fn route_admin_transactions(
    State(state): State<Arc<AppState>>,
    admin: Admin,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<TransactionEntry>>> {
    authorize(&state, admin)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    Ok(Json(db::list_transactions(&state.db, limit).await?))
}

pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route("/api/health", get(route_health))
        .route("/api/verify", get(route_verify))
        .route("/api/spin", post(route_spin))
        .route("/api/win-percentage", get(route_get_win_percentage))
        .route(
            "/api/admin/win-percentage",
            post(route_admin_set_win_percentage),
        )
        .route("/api/admin/rotate-seed", post(route_admin_rotate_seed))
        .route("/api/transactions", post(route_log_transaction))
        .route("/api/admin/transactions", get(route_admin_transactions))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
