use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::info;

use possync_api as api;
use possync_api::services::audit_store::SeaOrmAuditStore;
use possync_api::services::submission::{OrchestratorConfig, SubmissionOrchestrator};
use possync_api::services::sync::SyncService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Audit database
    let db = Arc::new(api::db::establish_connection(&cfg.database_url).await?);
    api::db::ensure_schema(&db).await?;

    // Shared HTTP client for both external systems
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // Accounting gateway with single-flight token refresh
    let auth = Arc::new(api::clients::AuthTokenProvider::new(
        http.clone(),
        cfg.accounting.base_url.clone(),
        cfg.accounting.username.clone(),
        cfg.accounting.password.clone(),
        cfg.accounting.token_ttl_margin_secs,
    ));
    let gateway = Arc::new(api::clients::HttpAccountingGateway::new(
        http.clone(),
        cfg.accounting.base_url.clone(),
        auth,
    ));

    // Upstream retail API serves orders, reference data and payments
    let retail = Arc::new(api::clients::RetailApiClient::new(
        http,
        cfg.retail.base_url.clone(),
        cfg.retail.api_key.clone(),
    ));

    let audit_store = Arc::new(SeaOrmAuditStore::new(db.clone()));
    let orchestrator = Arc::new(SubmissionOrchestrator::new(
        gateway,
        retail.clone(),
        retail.clone(),
        retail.clone(),
        audit_store,
        Arc::new(api::clients::DenominationVoucherCalculator),
        OrchestratorConfig {
            company_code: cfg.accounting.company_code.clone(),
            gift_promotion_brands: cfg.sync.gift_promotion_brands.clone(),
        },
    ));
    let sync_service = Arc::new(SyncService::new(
        retail,
        orchestrator,
        cfg.sync.concurrency,
        cfg.sync.window_days,
    ));

    let state = api::AppState {
        db,
        sync: sync_service,
    };
    let app = api::handlers::router(state);

    let addr = cfg.server_addr();
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
