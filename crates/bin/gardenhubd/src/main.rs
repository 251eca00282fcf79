//! # gardenhubd, the gardenhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Select the message transport (in-process or MQTT)
//! - Construct application services, injecting adapters via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer, no domain logic belongs here.

mod config;
mod transport;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gardenhub_adapter_http_axum::state::AppState;
use gardenhub_adapter_mqtt::MqttTransport;
use gardenhub_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteGardenStore};
use gardenhub_app::publisher::EventPublisher;
use gardenhub_app::services::{GardenService, PlantService};
use gardenhub_app::transport::InProcessTransport;

use crate::config::{Config, TransportKind};
use crate::transport::SelectedTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let shutdown = CancellationToken::new();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to initialise database")?;
    let store = Arc::new(SqliteGardenStore::new(db.pool().clone()));

    // Transport
    let (transport, driver) = select_transport(&config, shutdown.clone());
    let transport = Arc::new(transport);

    // Services
    let garden_service = GardenService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        EventPublisher::new(Arc::clone(&transport)),
    );
    let plant_service = PlantService::new(
        Arc::clone(&store),
        store,
        EventPublisher::new(Arc::clone(&transport)),
    );

    // HTTP
    // Cancelled on the shutdown signal so in-flight publishes stop early.
    let requests = shutdown.child_token();
    let state = AppState::new(garden_service, plant_service).with_shutdown(requests.clone());
    let app = gardenhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "gardenhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            requests.cancel();
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("gardenhubd shutting down");
    if let SelectedTransport::Mqtt(mqtt) = transport.as_ref()
        && let Err(err) = mqtt.disconnect().await
    {
        tracing::warn!(error = %err, "MQTT disconnect failed");
    }
    shutdown.cancel();
    if let Some(driver) = driver
        && let Err(err) = driver.await
    {
        tracing::warn!(error = %err, "MQTT driver task failed");
    }

    Ok(())
}

fn select_transport(
    config: &Config,
    shutdown: CancellationToken,
) -> (SelectedTransport, Option<JoinHandle<()>>) {
    match config.messaging.transport {
        TransportKind::InProcess => {
            tracing::info!(
                capacity = config.messaging.channel_capacity,
                "publishing integration messages in process"
            );
            let transport = InProcessTransport::new(config.messaging.channel_capacity);
            (SelectedTransport::InProcess(transport), None)
        }
        TransportKind::Mqtt => {
            let (transport, driver) = MqttTransport::connect(&config.messaging.mqtt, shutdown);
            (SelectedTransport::Mqtt(transport), Some(driver))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
