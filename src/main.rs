use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use smsgate::config::AppConfig;
use smsgate::db;
use smsgate::handlers;
use smsgate::services::sms::kaleyra::KaleyraGateway;
use smsgate::services::SmsService;
use smsgate::state::AppState;
use smsgate::tasks::sms::SendSmsTask;
use smsgate::tasks::{TaskQueue, TaskRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.kaleyra.api_key.is_none() || config.kaleyra.sender_id.is_none() {
        tracing::warn!("KALEYRA_API_KEY or KALEYRA_SENDER_ID not set; sends will be rejected by the gateway");
    }

    let conn = db::init_db(&config.database_url)?;

    let gateway = KaleyraGateway::new(config.kaleyra.clone());
    let sms = Arc::new(SmsService::new(Box::new(gateway), config.debug));
    tracing::info!(
        provider = sms.provider_name(),
        suppressed = sms.is_suppressed(),
        "SMS service ready"
    );

    let mut registry = TaskRegistry::new();
    SendSmsTask::register(&mut registry, Arc::clone(&sms));

    let queue = TaskQueue::start(registry, Arc::new(Mutex::new(conn)), &config.queue);
    queue.spawn_sweeper(config.queue.sweep_interval);

    let state = Arc::new(AppState {
        config: config.clone(),
        queue,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
