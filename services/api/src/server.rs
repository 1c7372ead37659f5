use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryProjectRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use plan_check::config::AppConfig;
use plan_check::error::AppError;
use plan_check::projects::ValidationService;
use plan_check::telemetry;
use plan_check::validation::RuleEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = RuleEngine::new(config.validation.clone());
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine.clone()),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let validation_service = Arc::new(ValidationService::new(repository, engine));

    let app = with_service_routes(validation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        disabled_rules = config.validation.disabled_rules.len(),
        "plan check service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
