use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use ticketbot_app::config::{self, SqlConfig, StoreDriverKind, DEFAULT_CONFIG_PATH, DEFAULT_TOKEN_PATH};
use ticketbot_app::{run_until_shutdown, AssignmentCoordinator};
use ticketbot_core::{events, AssignmentStore};
use ticketbot_gateway::{build_gateway_client, GatewayError, GatewayProviderKind};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = match SqlConfig::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(error) => {
            events::config_error(&error);
            return Err(error.into());
        }
    };
    let driver = match config.store_driver() {
        Ok(driver) => driver,
        Err(error) => {
            events::config_error(&error);
            return Err(error.into());
        }
    };

    events::store_descriptor(&config.redacted_dsn());
    let store = match open_store(&config, driver) {
        Ok(store) => store,
        Err(error) => {
            // Schema bootstrap failure is fatal at startup.
            events::store_error("ensure_schema", &error);
            return Err(error.into());
        }
    };

    let token = match config::read_token(DEFAULT_TOKEN_PATH) {
        Ok(token) => token,
        Err(error) => {
            events::config_error(&error);
            return Err(error.into());
        }
    };

    let gateway = build_gateway_client(GatewayProviderKind::InProcess.as_key())?;
    if let Err(error) = gateway.connect(&token).await {
        match error {
            GatewayError::Connection(_) => events::gateway_connection_error(&error),
            GatewayError::Session(_) | GatewayError::Request(_) => {
                events::gateway_session_error(&error);
            }
        }
        return Err(error.into());
    }

    let coordinator = Arc::new(AssignmentCoordinator::new(
        Arc::new(store),
        Arc::clone(&gateway),
    ));

    let shutdown = shutdown_signal()?;
    events::service_started();
    run_until_shutdown(coordinator, Arc::clone(&gateway), shutdown).await;

    events::service_stopping();
    gateway.close().await;
    // The store's connection is released when it drops here.
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,ticketbot=trace,ticketbot_app=trace,ticketbot_core=trace,\
                     ticketbot_gateway=trace"
                        .into()
                }),
        )
        .init();
}

fn open_store(config: &SqlConfig, driver: StoreDriverKind) -> Result<AssignmentStore, ticketbot_core::StoreError> {
    match driver {
        // For the sqlite backend the configured database name is the file
        // path.
        StoreDriverKind::Sqlite => AssignmentStore::open(config.database.name.as_str()),
    }
}

/// Resolves once SIGINT or SIGTERM arrives. Signal registration happens up
/// front so a registration failure aborts startup instead of leaving the
/// process unkillable-gracefully.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
