use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use ticketbot_core::{CategoryId, GuildId};
use tokio::sync::broadcast;

use crate::interface::{GatewayClient, GatewayError, GuildEvent};

pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 64;

/// Category created on the in-process "remote platform".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCategory {
    pub guild_id: GuildId,
    pub name: String,
    pub category_id: CategoryId,
}

/// In-process gateway provider.
///
/// Stands in for the wire transport: lifecycle notifications are fed through
/// [`InProcessGatewayClient::publish`] and category provisioning allocates
/// monotonically increasing identifiers. The daemon boots against it until a
/// real transport provider lands, and the integration tests drive it
/// directly.
#[derive(Debug)]
pub struct InProcessGatewayClient {
    sender: broadcast::Sender<GuildEvent>,
    connected: AtomicBool,
    next_category_id: AtomicU64,
    created: Mutex<Vec<CreatedCategory>>,
}

impl Default for InProcessGatewayClient {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_CAPACITY)
    }
}

impl InProcessGatewayClient {
    pub fn new(event_buffer_capacity: usize) -> Self {
        assert!(
            event_buffer_capacity > 0,
            "event_buffer_capacity must be greater than 0"
        );
        let (sender, _receiver) = broadcast::channel(event_buffer_capacity);
        Self {
            sender,
            connected: AtomicBool::new(false),
            next_category_id: AtomicU64::new(1),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Feeds a lifecycle notification to all subscribers. Dropped silently
    /// when the client is not connected, matching a closed wire session.
    pub fn publish(&self, event: GuildEvent) {
        if !self.connected.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.sender.send(event);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Categories provisioned so far, in creation order.
    pub fn created_categories(&self) -> Vec<CreatedCategory> {
        self.created
            .lock()
            .expect("in-process gateway category lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl GatewayClient for InProcessGatewayClient {
    async fn connect(&self, token: &str) -> Result<(), GatewayError> {
        if token.trim().is_empty() {
            return Err(GatewayError::Session(
                "authentication token is empty".to_owned(),
            ));
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!("in-process gateway connected");
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<GuildEvent> {
        self.sender.subscribe()
    }

    async fn create_category(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<CategoryId, GatewayError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(GatewayError::Connection(
                "gateway is not connected".to_owned(),
            ));
        }

        let category_id = CategoryId::new(self.next_category_id.fetch_add(1, Ordering::SeqCst));
        self.created
            .lock()
            .expect("in-process gateway category lock poisoned")
            .push(CreatedCategory {
                guild_id,
                name: name.to_owned(),
                category_id,
            });
        tracing::debug!(guild = %guild_id, category = %category_id, name, "category created");
        Ok(category_id)
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}
