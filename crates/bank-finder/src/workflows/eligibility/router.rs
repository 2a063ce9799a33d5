use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::domain::ProposalInput;
use super::report::REPORT_FILE_NAME;
use super::rules::{LenderPolicy, RuleSource, RuleTable};
use super::service::{EligibilityService, EligibilityServiceError};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Snapshot of the active rule table.
#[derive(Debug, Clone, Serialize)]
pub struct RuleTableView {
    pub loaded_at: DateTime<Utc>,
    pub lenders: Vec<LenderPolicy>,
}

impl RuleTableView {
    fn from_table(table: &RuleTable) -> Self {
        Self {
            loaded_at: table.loaded_at(),
            lenders: table.policies().to_vec(),
        }
    }
}

/// Router builder exposing evaluation, export and rule management endpoints.
pub fn eligibility_router<S>(service: Arc<EligibilityService<S>>) -> Router
where
    S: RuleSource + 'static,
{
    Router::new()
        .route("/api/v1/eligibility/evaluate", post(evaluate_handler::<S>))
        .route("/api/v1/eligibility/export", post(export_handler::<S>))
        .route("/api/v1/rules", get(rules_handler::<S>))
        .route("/api/v1/rules/reload", post(reload_handler::<S>))
        .with_state(service)
}

pub(crate) async fn evaluate_handler<S>(
    State(service): State<Arc<EligibilityService<S>>>,
    Json(input): Json<ProposalInput>,
) -> Response
where
    S: RuleSource + 'static,
{
    match service.evaluate(input) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<S>(
    State(service): State<Arc<EligibilityService<S>>>,
    Json(input): Json<ProposalInput>,
) -> Response
where
    S: RuleSource + 'static,
{
    match service.export(input) {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{REPORT_FILE_NAME}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rules_handler<S>(State(service): State<Arc<EligibilityService<S>>>) -> Response
where
    S: RuleSource + 'static,
{
    let view = RuleTableView::from_table(&service.rules());
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn reload_handler<S>(
    State(service): State<Arc<EligibilityService<S>>>,
) -> Response
where
    S: RuleSource + 'static,
{
    // Reading and parsing the sheet is blocking file work.
    let reloaded = tokio::task::spawn_blocking(move || service.reload_rules()).await;

    match reloaded {
        Ok(Ok(table)) => {
            let payload = json!({
                "status": "reloaded",
                "lenders": table.len(),
                "loaded_at": table.loaded_at(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            let payload = json!({
                "error": format!("rule reload did not complete: {join_error}"),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn error_response(error: EligibilityServiceError) -> Response {
    let status = match &error {
        EligibilityServiceError::Proposal(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EligibilityServiceError::Rules(_) | EligibilityServiceError::Export(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
