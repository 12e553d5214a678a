use crate::cli::ServeArgs;
use crate::infra::{AppState, PipelineState};
use crate::routes::with_pipeline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bidmatch::config::AppConfig;
use bidmatch::error::AppError;
use bidmatch::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipeline = PipelineState::from_settings(&config.pipeline)?;
    let thresholds = pipeline.engine.config().clone();

    let app = with_pipeline_routes(pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        speed = config.pipeline.speed.label(),
        min_score = thresholds.min_score,
        shortlist_size = thresholds.shortlist_size,
        "bid matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
