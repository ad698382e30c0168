use std::future::Future;
use std::sync::Arc;

use ticketbot_core::events;
use ticketbot_gateway::{GatewayClient, GatewayError, GuildEvent};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;

use crate::coordinator::{AssignmentCoordinator, HandleError};

/// Dispatches gateway notifications until `shutdown` resolves or the event
/// stream closes.
///
/// Each notification is handled on its own task; once shutdown begins no new
/// notifications are accepted, but in-flight handling is allowed to finish
/// before this returns.
pub async fn run_until_shutdown(
    coordinator: Arc<AssignmentCoordinator>,
    gateway: Arc<dyn GatewayClient>,
    shutdown: impl Future<Output = ()>,
) {
    let mut notifications = gateway.events();
    let mut inflight = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            received = notifications.recv() => match received {
                Ok(event) => {
                    let coordinator = Arc::clone(&coordinator);
                    inflight.spawn(async move { dispatch(coordinator, event).await });
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "gateway event stream lagged; notifications dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    while inflight.join_next().await.is_some() {}
}

async fn dispatch(coordinator: Arc<AssignmentCoordinator>, event: GuildEvent) {
    match event {
        GuildEvent::GuildJoined { guild_id, name } => {
            if let Err(error) = coordinator.handle_guild_joined(guild_id, &name).await {
                log_handle_error(&error);
            }
        }
        GuildEvent::GuildLeft { guild_id, name } => {
            coordinator.handle_guild_left(guild_id, &name);
        }
    }
}

fn log_handle_error(error: &HandleError) {
    match error {
        HandleError::Store { .. } => events::store_error("lookup", error),
        HandleError::Record { .. } => events::store_error("upsert", error),
        HandleError::Provision { source, .. } => match source {
            GatewayError::Connection(_) => events::gateway_connection_error(error),
            GatewayError::Session(_) => events::gateway_session_error(error),
            GatewayError::Request(_) => events::gateway_request_error(error),
        },
    }
}
