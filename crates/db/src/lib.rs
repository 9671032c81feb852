pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, ping, DbPool};
pub use fixtures::{DemoInventory, SeedResult, VerificationResult};
pub use repositories::{InMemoryInventoryRepository, RepositoryError, SqlInventoryRepository};
