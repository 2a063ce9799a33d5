use crate::gate::{require_access_key, AccessGate};
use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use bank_finder::workflows::eligibility::{eligibility_router, EligibilityService, RuleSource};
use serde_json::json;
use std::sync::Arc;

/// Eligibility routes behind the access gate, plus the open operational endpoints.
pub(crate) fn with_eligibility_routes<S>(
    service: Arc<EligibilityService<S>>,
    gate: AccessGate,
) -> Router
where
    S: RuleSource + 'static,
{
    eligibility_router(service)
        .route_layer(middleware::from_fn_with_state(gate, require_access_key))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
