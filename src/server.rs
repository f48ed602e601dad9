//! HTTP surface of the simulation service.
//!
//! Endpoints:
//!   POST /api/simulate - run a lab iteration
//!   GET  /health       - liveness probe

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::lab::SurvivalLab;
use crate::logging::{log, obj, params_hash, v_str, Domain, Level};
use crate::schema::{SimulationRequest, SimulationResponse};

#[derive(Clone)]
pub struct AppState {
    lab: Arc<SurvivalLab>,
}

pub fn router(lab: Arc<SurvivalLab>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/simulate", post(simulate))
        .layer(CorsLayer::permissive())
        .with_state(AppState { lab })
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, (StatusCode, Json<Value>)> {
    let request_hash = params_hash(&serde_json::to_string(&request).unwrap_or_default());
    let resolved = request.resolve().map_err(|err| {
        log(
            Level::Warn,
            Domain::Server,
            "rejected",
            obj(&[("request_hash", v_str(&request_hash)), ("reason", v_str(&err.to_string()))]),
        );
        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"detail": err.to_string()})))
    })?;

    log(
        Level::Info,
        Domain::Server,
        "simulate",
        obj(&[
            ("request_hash", v_str(&request_hash)),
            ("rounds", json!(resolved.rounds)),
            ("agents", json!(resolved.agent_names)),
        ]),
    );

    let lab = Arc::clone(&state.lab);
    let response = tokio::task::spawn_blocking(move || lab.run_iteration(&resolved))
        .await
        .map_err(|err| {
            log(
                Level::Error,
                Domain::Server,
                "iteration_panicked",
                obj(&[("request_hash", v_str(&request_hash)), ("error", v_str(&err.to_string()))]),
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "simulation failed"})),
            )
        })?;
    Ok(Json(response))
}
