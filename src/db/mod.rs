pub mod aliases;
pub mod bot_state;
pub mod connection;
pub mod snapshots;

pub use aliases::SqliteAliasStore;
pub use bot_state::BotStateStore;
pub use connection::{init_db, Database};
pub use snapshots::SqliteSnapshotStore;
