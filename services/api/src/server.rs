use crate::cli::ServeArgs;
use crate::infra::{load_catalog, spawn_idle_sweeper, AppState, InMemorySessionRepository};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fitscan::assessments::AssessmentService;
use fitscan::config::AppConfig;
use fitscan::error::AppError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) async fn run(mut args: ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(&config.catalog)?);
    let repository = Arc::new(InMemorySessionRepository::new(&config.sessions));
    spawn_idle_sweeper(Arc::clone(&repository), sweep_interval(config.sessions.idle_timeout));
    let assessment_service = Arc::new(AssessmentService::new(catalog, repository));

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "fitscan assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn sweep_interval(idle_timeout: Duration) -> Duration {
    idle_timeout.min(MAX_SWEEP_INTERVAL)
}
