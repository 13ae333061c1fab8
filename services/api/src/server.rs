use crate::cli::ServeArgs;
use crate::infra::{policy_engine, AppState, InMemoryScreeningRepository};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mvr_screen::config::AppConfig;
use mvr_screen::error::AppError;
use mvr_screen::screening::{JsonFactExtractor, ScreeningService};
use mvr_screen::telemetry;
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

    let engine = policy_engine(&config.policy)?;
    info!(
        rules = engine.rules().len(),
        accident_threshold = config.policy.accident_threshold,
        uninspected_vehicle_threshold = config.policy.uninspected_vehicle_threshold,
        "policy table loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryScreeningRepository::default());
    let screening_service = Arc::new(ScreeningService::new(
        Arc::new(JsonFactExtractor),
        repository,
        engine,
    ));

    let app = with_screening_routes(screening_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mvr screening service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
