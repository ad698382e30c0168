//! Assignment coordination, configuration, and the notification run loop.

pub mod config;
pub mod coordinator;
pub mod runtime;

pub use config::{ConfigError, SqlConfig, StoreDriverKind};
pub use coordinator::{
    AssignmentCoordinator, HandleError, JoinOutcome, CLOSED_CATEGORY_NAME, OPEN_CATEGORY_NAME,
};
pub use runtime::run_until_shutdown;
