// Initialize configuration
// Set up logging
// Create the Telegram alert sink
// Start heartbeat and optional liveness server
// Run the feed supervisor until Ctrl-C

use withdrawal_monitor::{
    api,
    blockchain::{FeedSettings, ReconnectBackoff, Supervisor, TokioSleeper, WsConnector},
    config::Config,
    notify::{run_heartbeat, AlertSink, HeartbeatSchedule, TelegramClient},
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🔌 Starting Solana Wallet Monitor…");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let telegram = TelegramClient::new(&config.telegram_bot_token, &config.telegram_chat_id)?;
    let sink = AlertSink::new(Arc::new(telegram), config.explorer_account_url.clone());

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            ctrl_c_shutdown.cancel();
        }
    });

    // Start heartbeat task
    let heartbeat = config.heartbeat_interval.map(|interval| {
        let schedule = HeartbeatSchedule {
            initial_delay: config.heartbeat_initial_delay,
            interval,
        };
        tokio::spawn(run_heartbeat(sink.clone(), schedule, TokioSleeper, shutdown.clone()))
    });

    // Start liveness server
    if let Some(port) = config.server_port {
        let addr = format!("{}:{}", config.server_host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Liveness endpoint listening on {}", addr);

        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = axum::serve(listener, api::create_router())
                .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
                .await;
            if let Err(e) = result {
                error!("Liveness server failed: {}", e);
            }
        });
    }

    // Run the feed supervisor
    let mut supervisor = Supervisor::new(
        WsConnector::from_config(&config),
        config.watched_addresses.clone(),
        FeedSettings::from_config(&config),
        sink,
        ReconnectBackoff::new(config.reconnect_initial_delay, config.reconnect_max_delay),
        TokioSleeper,
    );
    supervisor.run(shutdown.clone()).await;

    if let Some(heartbeat) = heartbeat {
        let _ = heartbeat.await;
    }

    Ok(())
}
