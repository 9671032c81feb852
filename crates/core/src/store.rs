//! Narrow data-access port the pipeline uses to reach inventory storage.
//!
//! Implementations live outside this crate (SQLite and in-memory repositories).
//! Every call may fail with [`StoreError`]; callers are expected to degrade to a
//! user-facing reply rather than propagate the failure.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::inventory::{ExpiringBatch, LowStockItem};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("inventory storage unavailable: {0}")]
    Unavailable(String),
    #[error("inventory storage returned malformed data: {0}")]
    Malformed(String),
    #[error("inventory storage rejected the change: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Current quantity for `item`, or `None` when no active item matches.
    async fn stock_level(&self, item: &str) -> Result<Option<i64>, StoreError>;

    async fn items_below_threshold(&self) -> Result<Vec<LowStockItem>, StoreError>;

    /// Batches expiring on or before `date`, earliest first.
    async fn expiring_by(&self, date: NaiveDate) -> Result<Vec<ExpiringBatch>, StoreError>;

    /// Returns `Ok(false)` when no item matched and nothing was changed.
    async fn set_threshold(&self, item: &str, threshold: i64) -> Result<bool, StoreError>;

    /// Returns `Ok(false)` when no item matched and nothing was changed.
    async fn set_stock(&self, item: &str, quantity: i64) -> Result<bool, StoreError>;
}
