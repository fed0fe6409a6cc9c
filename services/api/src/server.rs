use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use horizon_intake::admin::{AdminApi, AdminApplicationService, InterestFieldService};
use horizon_intake::config::AppConfig;
use horizon_intake::error::AppError;
use horizon_intake::intake::{PublicApi, SubmissionService};
use horizon_intake::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    AppState, EnvAccountService, InMemoryApplicationRepository, InMemoryInterestFieldRepository,
    InMemoryResumeStore, LoggingMailer,
};
use crate::routes::with_api_routes;

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

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let resumes = Arc::new(InMemoryResumeStore::from_backend(&config.backend));
    let interest_fields = Arc::new(InMemoryInterestFieldRepository::default());
    let mailer = Arc::new(LoggingMailer);
    let accounts = Arc::new(EnvAccountService::from_env());

    let public = Arc::new(PublicApi {
        submissions: SubmissionService::new(
            repository.clone(),
            resumes.clone(),
            mailer.clone(),
            config.intake.clone(),
            config.backend.email_from.clone(),
        ),
        interest_fields: interest_fields.clone(),
        mailer,
        email_api_key: config.backend.email_api_key.clone(),
        email_from: config.backend.email_from.clone(),
    });
    let admin = Arc::new(AdminApi {
        applications: AdminApplicationService::new(
            repository,
            resumes,
            config.intake.page_size,
        ),
        settings: InterestFieldService::new(interest_fields),
        accounts,
    });

    let app = with_api_routes(public, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "talent intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
