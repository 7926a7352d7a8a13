use std::time::Duration;

use dotenvy::dotenv;
use log::*;
use review_engine::SqliteDatabase;
use review_server::{
    config::ServerConfig,
    errors::ServerError,
    scheduler::{start_dispatch_worker, start_ingest_worker, DispatchWindow, SchedulerState},
    service::ReviewService,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = ServerConfig::from_env_or_default();
    info!("🚀️ Starting review gateway");
    match run(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    if config.database_url.is_empty() {
        return Err(ServerError::ConfigurationError("RVG_DATABASE_URL is not set".to_string()));
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 5)
        .await
        .map_err(|e| ServerError::InitializeError("database".to_string(), e.to_string()))?;
    let window = DispatchWindow::new(config.dispatch_start_hour, config.dispatch_end_hour).ok_or_else(|| {
        ServerError::ConfigurationError(format!(
            "Invalid dispatch window {}:00 - {}:00",
            config.dispatch_start_hour, config.dispatch_end_hour
        ))
    })?;
    let state = SchedulerState::new(window);
    // All engine API wiring happens inside the service; the workers clone its instances below.
    let service = ReviewService::new(&config, db, state.clone())?;

    if config.chat_health_check {
        match service.dispatch_api().gateway().get_state().await {
            Ok(s) if s.is_authorized() => info!("🚀️ Messaging gateway instance is authorized"),
            Ok(s) => {
                warn!("🚀️ Messaging gateway instance is not ready: {}. Sends will fail until it is.", s.state_instance)
            },
            Err(e) => warn!("🚀️ Could not reach the messaging gateway: {e}. Sends will fail until it is reachable."),
        }
    } else {
        info!("🚀️ Messaging gateway health check is disabled");
    }

    let ingest_worker =
        start_ingest_worker(service.ingest_api().clone(), Duration::from_secs(config.ingest_interval_secs));
    let dispatch_worker = start_dispatch_worker(
        service.dispatch_api().clone(),
        state,
        Duration::from_secs(config.dispatch_interval_secs),
        config.max_batch_limit,
    );

    info!("🚀️ Workers running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await.ok();
    info!("🚀️ Shutting down");
    ingest_worker.abort();
    dispatch_worker.abort();
    Ok(())
}
