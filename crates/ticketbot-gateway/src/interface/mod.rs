use serde::{Deserialize, Serialize};
use thiserror::Error;
use ticketbot_core::{CategoryId, GuildId};
use tokio::sync::broadcast;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport-level failure while establishing or holding the connection.
    /// Fatal at startup.
    #[error("gateway connection error: {0}")]
    Connection(String),
    /// Authentication/session establishment failure. Fatal at startup.
    #[error("gateway session error: {0}")]
    Session(String),
    /// Per-call failure once connected. Aborts only the notification being
    /// handled.
    #[error("gateway request error: {0}")]
    Request(String),
}

/// Guild lifecycle notification delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuildEvent {
    GuildJoined { guild_id: GuildId, name: String },
    GuildLeft { guild_id: GuildId, name: String },
}

impl GuildEvent {
    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::GuildJoined { guild_id, .. } | Self::GuildLeft { guild_id, .. } => *guild_id,
        }
    }

    pub fn guild_name(&self) -> &str {
        match self {
            Self::GuildJoined { name, .. } | Self::GuildLeft { name, .. } => name,
        }
    }
}

/// Client interface consumed by the coordinator. Transport details stay
/// behind this trait; implementations fan guild lifecycle notifications out
/// through a broadcast stream.
#[async_trait::async_trait]
pub trait GatewayClient: Send + Sync {
    /// Authenticates against the remote platform with the verbatim token.
    async fn connect(&self, token: &str) -> Result<(), GatewayError>;

    /// Subscribes to guild lifecycle notifications. Subscriptions opened
    /// before `connect` observe every event published afterwards.
    fn events(&self) -> broadcast::Receiver<GuildEvent>;

    /// Creates a categorization target on the remote platform and returns
    /// its identifier.
    async fn create_category(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<CategoryId, GatewayError>;

    /// Tears the connection down; no further events are delivered.
    async fn close(&self);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayProviderError {
    #[error("unknown gateway provider key: {0}")]
    UnknownProviderKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_event_exposes_id_and_name_for_both_variants() {
        let joined = GuildEvent::GuildJoined {
            guild_id: GuildId::new(42),
            name: "support-hub".to_owned(),
        };
        let left = GuildEvent::GuildLeft {
            guild_id: GuildId::new(7),
            name: "archived".to_owned(),
        };

        assert_eq!(joined.guild_id(), GuildId::new(42));
        assert_eq!(joined.guild_name(), "support-hub");
        assert_eq!(left.guild_id(), GuildId::new(7));
        assert_eq!(left.guild_name(), "archived");
    }

    #[test]
    fn gateway_error_messages_name_the_failure_class() {
        assert_eq!(
            GatewayError::Connection("refused".to_owned()).to_string(),
            "gateway connection error: refused"
        );
        assert_eq!(
            GatewayError::Session("bad token".to_owned()).to_string(),
            "gateway session error: bad token"
        );
        assert_eq!(
            GatewayError::Request("rate limited".to_owned()).to_string(),
            "gateway request error: rate limited"
        );
    }
}
