use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use ticketbot_core::{events, AssignmentRecord, AssignmentStore, CategoryId, GuildId, StoreError};
use ticketbot_gateway::{GatewayClient, GatewayError};
use tokio::sync::Mutex as AsyncMutex;

pub const OPEN_CATEGORY_NAME: &str = "Open Tickets";
pub const CLOSED_CATEGORY_NAME: &str = "Closed Tickets";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The assignment lookup failed; the notification is dropped and a later
    /// redelivery retries from scratch.
    #[error("assignment lookup failed for guild {guild_id}: {source}")]
    Store {
        guild_id: GuildId,
        source: StoreError,
    },
    /// Category provisioning failed; no record was written and the guild
    /// stays unassigned.
    #[error("category provisioning failed for guild {guild_id}: {source}")]
    Provision {
        guild_id: GuildId,
        source: GatewayError,
    },
    /// Both categories were provisioned but the upsert failed. No partial
    /// row exists; the remote categories are orphaned until an operator
    /// cleans them up.
    #[error(
        "failed to persist assignment for guild {guild_id} \
         (orphaned categories: open={open}, closed={closed}): {source}"
    )]
    Record {
        guild_id: GuildId,
        open: CategoryId,
        closed: CategoryId,
        source: StoreError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A record already existed; repeated joined notifications are no-ops.
    AlreadyAssigned(AssignmentRecord),
    /// Both categories were created and the record persisted.
    Provisioned(AssignmentRecord),
}

/// Lazily populated map of per-guild mutual-exclusion handles.
///
/// Handling for one guild serializes on its own lock while other guilds
/// proceed concurrently. Entries are pruned once the last outstanding handle
/// is returned, so the map stays bounded by the number of guilds in flight.
#[derive(Debug, Default)]
struct GuildLocks {
    inner: Mutex<HashMap<GuildId, Arc<AsyncMutex<()>>>>,
}

impl GuildLocks {
    fn acquire(&self, guild_id: GuildId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.inner.lock().expect("guild lock map poisoned");
        Arc::clone(
            locks
                .entry(guild_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    fn release(&self, guild_id: GuildId, handle: Arc<AsyncMutex<()>>) {
        let mut locks = self.inner.lock().expect("guild lock map poisoned");
        drop(handle);
        if let Some(entry) = locks.get(&guild_id) {
            if Arc::strong_count(entry) == 1 {
                locks.remove(&guild_id);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().expect("guild lock map poisoned").len()
    }
}

/// Reacts to guild lifecycle notifications: establishes the guild's
/// assignment on first join, idempotently ignores repeats, and never
/// persists a partially-provisioned record.
pub struct AssignmentCoordinator {
    store: Arc<AssignmentStore>,
    gateway: Arc<dyn GatewayClient>,
    locks: GuildLocks,
}

impl AssignmentCoordinator {
    pub fn new(store: Arc<AssignmentStore>, gateway: Arc<dyn GatewayClient>) -> Self {
        Self {
            store,
            gateway,
            locks: GuildLocks::default(),
        }
    }

    /// Handles a guild-joined notification.
    ///
    /// The lookup/provision/upsert sequence runs under the guild's keyed
    /// lock, so overlapping notifications for the same guild cannot both
    /// observe a missing record and double-provision categories.
    pub async fn handle_guild_joined(
        &self,
        guild_id: GuildId,
        guild_name: &str,
    ) -> Result<JoinOutcome, HandleError> {
        events::guild_joined(guild_name);

        let lock = self.locks.acquire(guild_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.establish_assignment(guild_id).await
        };
        self.locks.release(guild_id, lock);
        outcome
    }

    async fn establish_assignment(&self, guild_id: GuildId) -> Result<JoinOutcome, HandleError> {
        match self.store.lookup(guild_id) {
            Err(source) => return Err(HandleError::Store { guild_id, source }),
            Ok(Some(record)) => return Ok(JoinOutcome::AlreadyAssigned(record)),
            Ok(None) => {}
        }

        let open = self
            .gateway
            .create_category(guild_id, OPEN_CATEGORY_NAME)
            .await
            .map_err(|source| HandleError::Provision { guild_id, source })?;
        let closed = self
            .gateway
            .create_category(guild_id, CLOSED_CATEGORY_NAME)
            .await
            .map_err(|source| HandleError::Provision { guild_id, source })?;

        let record = AssignmentRecord {
            guild_id,
            open_category: open,
            closed_category: closed,
        };
        self.store
            .upsert(&record)
            .map_err(|source| HandleError::Record {
                guild_id,
                open,
                closed,
                source,
            })?;

        tracing::info!(
            guild = %guild_id,
            open_category = %open,
            closed_category = %closed,
            "assignment established"
        );
        Ok(JoinOutcome::Provisioned(record))
    }

    /// Handles a guild-left notification. The assignment is retained so a
    /// re-join finds the existing categories instead of provisioning a
    /// second pair.
    pub fn handle_guild_left(&self, guild_id: GuildId, guild_name: &str) {
        events::guild_left(guild_name);
        tracing::debug!(guild = %guild_id, "retaining assignment for potential re-join");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_hands_out_the_same_lock_per_guild() {
        let locks = GuildLocks::default();
        let first = locks.acquire(GuildId::new(42));
        let second = locks.acquire(GuildId::new(42));
        assert!(Arc::ptr_eq(&first, &second));

        let other = locks.acquire(GuildId::new(7));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn release_prunes_entry_once_last_handle_is_returned() {
        let locks = GuildLocks::default();
        let guild = GuildId::new(42);

        let first = locks.acquire(guild);
        let second = locks.acquire(guild);
        assert_eq!(locks.len(), 1);

        locks.release(guild, first);
        assert_eq!(locks.len(), 1, "entry stays while a handle is out");

        locks.release(guild, second);
        assert_eq!(locks.len(), 0, "entry pruned with the last handle");
    }

    #[tokio::test]
    async fn contended_lock_serializes_critical_sections() {
        let locks = Arc::new(GuildLocks::default());
        let guild = GuildId::new(42);

        let handle = locks.acquire(guild);
        let guard = handle.lock().await;

        let contender = Arc::clone(&locks);
        let waiter = tokio::spawn(async move {
            let handle = contender.acquire(guild);
            let guard = handle.lock().await;
            drop(guard);
            contender.release(guild, handle);
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished(), "contender must wait for the guard");

        drop(guard);
        locks.release(guild, handle);
        waiter.await.expect("contender completes");
        assert_eq!(locks.len(), 0);
    }
}
