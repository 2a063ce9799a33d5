use crate::cli::ServeArgs;
use crate::gate::AccessGate;
use crate::infra::AppState;
use crate::routes::with_eligibility_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bank_finder::config::AppConfig;
use bank_finder::error::AppError;
use bank_finder::telemetry::{self, LogSink};
use bank_finder::workflows::eligibility::{rule_source_for, EligibilityService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(rules) = args.rules.take() {
        config.rules.path = rules;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(EligibilityService::from_source(rule_source_for(
        config.rules.path.clone(),
    ))?);

    let gate = AccessGate::new(config.access.access_key.clone());
    if !gate.is_enforced() {
        warn!("APP_ACCESS_KEY not set; eligibility endpoints are unauthenticated");
    }

    let app = with_eligibility_routes(service, gate)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rules = %config.rules.path.display(),
        "bank eligibility service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
