use serde::{Deserialize, Serialize};

use crate::identifiers::{CategoryId, GuildId};

/// Durable association between a guild and its open/closed ticket categories.
///
/// A record is only ever persisted with both category ids populated; a
/// partially-provisioned guild has no row at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub guild_id: GuildId,
    pub open_category: CategoryId,
    pub closed_category: CategoryId,
}
