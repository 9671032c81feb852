use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use medstock_core::domain::inventory::{ExpiringBatch, LowStockItem};
use medstock_core::store::{InventoryStore, StoreError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    StockLevel(String),
    ItemsBelowThreshold,
    ExpiringBy(NaiveDate),
    SetThreshold(String, i64),
    SetStock(String, i64),
}

/// Store double that answers from fixed data and records every call.
#[derive(Default)]
pub struct RecordingStore {
    pub stock: HashMap<String, i64>,
    pub below_threshold: Vec<LowStockItem>,
    pub expiring: Vec<ExpiringBatch>,
    pub fail: bool,
    pub(crate) calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn with_stock(entries: &[(&str, i64)]) -> Self {
        Self {
            stock: entries.iter().map(|(item, quantity)| (item.to_string(), *quantity)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for RecordingStore {
    async fn stock_level(&self, item: &str) -> Result<Option<i64>, StoreError> {
        self.record(StoreCall::StockLevel(item.to_string()))?;
        Ok(self.stock.get(item).copied())
    }

    async fn items_below_threshold(&self) -> Result<Vec<LowStockItem>, StoreError> {
        self.record(StoreCall::ItemsBelowThreshold)?;
        Ok(self.below_threshold.clone())
    }

    async fn expiring_by(&self, date: NaiveDate) -> Result<Vec<ExpiringBatch>, StoreError> {
        self.record(StoreCall::ExpiringBy(date))?;
        Ok(self.expiring.iter().filter(|batch| batch.expiry_date <= date).cloned().collect())
    }

    async fn set_threshold(&self, item: &str, threshold: i64) -> Result<bool, StoreError> {
        self.record(StoreCall::SetThreshold(item.to_string(), threshold))?;
        Ok(self.stock.contains_key(item))
    }

    async fn set_stock(&self, item: &str, quantity: i64) -> Result<bool, StoreError> {
        self.record(StoreCall::SetStock(item.to_string(), quantity))?;
        Ok(self.stock.contains_key(item))
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}
