use thiserror::Error;

use medstock_core::store::StoreError;

pub mod inventory;
pub mod memory;

pub use inventory::SqlInventoryRepository;
pub use memory::InMemoryInventoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(sqlx::Error::Database(db)) if db.is_check_violation() => {
                StoreError::Rejected(db.message().to_owned())
            }
            RepositoryError::Database(other) => StoreError::Unavailable(other.to_string()),
            RepositoryError::Decode(message) => StoreError::Malformed(message),
        }
    }
}
