//! Narrow seam to the chat-platform gateway: typed guild lifecycle events,
//! the client trait, and the in-process provider.

pub mod factory;
pub mod interface;
pub mod providers;

pub use factory::{build_gateway_client, supported_provider_keys, GatewayProviderKind};
pub use interface::{GatewayClient, GatewayError, GatewayProviderError, GuildEvent};
pub use providers::in_process::InProcessGatewayClient;
