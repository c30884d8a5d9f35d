use crate::cli::ServeArgs;
use crate::infra::{open_csv_session, AppState};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use request_intake::config::AppConfig;
use request_intake::error::AppError;
use request_intake::telemetry;
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

    // Without a roster snapshot no form can be offered, so this failure ends startup.
    let session = Arc::new(open_csv_session(&config.intake)?);
    info!(
        roster = %config.intake.roster_csv.display(),
        requests = %config.intake.requests_csv.display(),
        roster_size = session.roster_size(),
        "intake session ready"
    );

    let app = with_intake_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "request intake service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
