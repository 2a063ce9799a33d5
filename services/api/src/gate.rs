use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub(crate) const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Shared-secret check in front of the eligibility routes. Without a key every request passes.
#[derive(Clone, Default)]
pub(crate) struct AccessGate {
    key: Option<Arc<str>>,
}

impl AccessGate {
    pub(crate) fn new(key: Option<String>) -> Self {
        Self {
            key: key.map(Arc::from),
        }
    }

    pub(crate) fn is_enforced(&self) -> bool {
        self.key.is_some()
    }

    fn admits(&self, presented: Option<&str>) -> bool {
        match (&self.key, presented) {
            (None, _) => true,
            (Some(expected), Some(presented)) => expected.as_ref() == presented,
            (Some(_), None) => false,
        }
    }
}

pub(crate) async fn require_access_key(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if gate.admits(presented) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "rejected request without a valid access key");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid access key" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_gate_admits_everything() {
        let gate = AccessGate::new(None);
        assert!(!gate.is_enforced());
        assert!(gate.admits(None));
        assert!(gate.admits(Some("anything")));
    }

    #[test]
    fn enforced_gate_requires_exact_key() {
        let gate = AccessGate::new(Some("s3cret".to_string()));
        assert!(gate.is_enforced());
        assert!(gate.admits(Some("s3cret")));
        assert!(!gate.admits(Some("S3CRET")));
        assert!(!gate.admits(None));
    }
}
