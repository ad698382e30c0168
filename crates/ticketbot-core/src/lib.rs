//! Domain types, durable assignment storage, and the structured event log
//! shared by the ticketbot crates.

pub mod error;
pub mod events;
pub mod identifiers;
pub mod record;
pub mod store;
pub mod test_support;

pub use error::StoreError;
pub use identifiers::{CategoryId, GuildId};
pub use record::AssignmentRecord;
pub use store::AssignmentStore;
