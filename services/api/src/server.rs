use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use portfolio_analytics::analytics::{PortfolioAnalyticsService, SessionAuthenticator};
use portfolio_analytics::config::AppConfig;
use portfolio_analytics::error::AppError;
use portfolio_analytics::telemetry;
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
    if let Some(dir) = args.data_dir.take() {
        config.analytics.snapshot_dir = Some(dir);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = load_store(config.analytics.snapshot_dir.as_deref())?;
    let service = Arc::new(PortfolioAnalyticsService::new(
        Arc::new(store),
        &config.analytics,
    ));
    let authenticator = SessionAuthenticator::new(&config.auth);

    let app = with_report_routes(service, authenticator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        window_policy = ?config.analytics.window_policy,
        loss_aggregation = ?config.analytics.loss_aggregation,
        "portfolio analytics service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
