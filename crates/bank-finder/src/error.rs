use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::eligibility::report::ExportError;
use crate::workflows::eligibility::{EligibilityServiceError, ProposalError, RuleTableError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Rules(RuleTableError),
    Proposal(ProposalError),
    Export(ExportError),
    Input(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Rules(err) => write!(f, "lender rules error: {}", err),
            AppError::Proposal(err) => write!(f, "invalid proposal: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Input(err) => write!(f, "unreadable proposal input: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Rules(err) => Some(err),
            AppError::Proposal(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Input(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Proposal(_) | AppError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Rules(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RuleTableError> for AppError {
    fn from(value: RuleTableError) -> Self {
        Self::Rules(value)
    }
}

impl From<ProposalError> for AppError {
    fn from(value: ProposalError) -> Self {
        Self::Proposal(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Input(value)
    }
}

impl From<EligibilityServiceError> for AppError {
    fn from(value: EligibilityServiceError) -> Self {
        match value {
            EligibilityServiceError::Proposal(err) => Self::Proposal(err),
            EligibilityServiceError::Rules(err) => Self::Rules(err),
            EligibilityServiceError::Export(err) => Self::Export(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_errors_map_to_unprocessable_entity() {
        let error = AppError::from(ProposalError::Negative {
            field: "land_cost",
            value: -1.0,
        });
        assert!(error.to_string().contains("land_cost"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn rule_errors_map_to_internal_error() {
        let error = AppError::from(EligibilityServiceError::Rules(RuleTableError::NoLenders));
        assert!(matches!(error, AppError::Rules(_)));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
