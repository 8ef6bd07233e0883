pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod stores;

pub use connection::{connect, connect_in_memory, DbPool};
pub use fixtures::demo_snapshot;
pub use stores::{InMemoryDataStore, SqlDataStore};
