//! Structured event log: one operation per domain event kind, each emitted
//! at a fixed severity. Emission never fails and never mutates domain state.

use std::fmt::Display;

pub fn guild_joined(guild_name: &str) {
    tracing::info!(guild = %guild_name, "joined guild");
}

pub fn guild_left(guild_name: &str) {
    tracing::info!(guild = %guild_name, "left guild");
}

pub fn service_started() {
    tracing::info!("ticketbot is now running; send SIGINT or SIGTERM to exit");
}

pub fn service_stopping() {
    tracing::info!("ticketbot is now stopping");
}

pub fn config_error(err: &dyn Display) {
    tracing::error!(error = %err, "configuration error");
}

pub fn gateway_connection_error(err: &dyn Display) {
    tracing::error!(error = %err, "gateway connection error");
}

pub fn gateway_session_error(err: &dyn Display) {
    tracing::error!(error = %err, "gateway session error");
}

/// Per-call gateway failure once connected; aborts only the notification
/// being handled.
pub fn gateway_request_error(err: &dyn Display) {
    tracing::error!(error = %err, "gateway request error");
}

/// Store failures are logged at error severity; whether they abort the
/// process is the caller's call (fatal during schema bootstrap, per-event
/// otherwise).
pub fn store_error(operation: &str, err: &dyn Display) {
    tracing::error!(operation, error = %err, "store error");
}

pub fn store_descriptor(dsn: &str) {
    tracing::debug!(dsn, "store connection descriptor");
}

pub fn store_opening(path: &str) {
    tracing::trace!(path, "opening store connection");
}

pub fn store_opened(path: &str) {
    tracing::trace!(path, "store connection opened");
}
