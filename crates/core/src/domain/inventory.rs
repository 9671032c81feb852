use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item whose stock has fallen under its reorder threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub item: String,
    pub quantity: i64,
    pub threshold: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringBatch {
    pub item: String,
    pub expiry_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity_in_stock: i64,
    pub reorder_level: i64,
    pub active: bool,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity_in_stock: i64, reorder_level: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            quantity_in_stock,
            reorder_level,
            active: true,
        }
    }

    pub fn below_threshold(&self) -> bool {
        self.quantity_in_stock < self.reorder_level
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_number: String,
    pub item: String,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub active: bool,
}

/// Canonical form used when matching item names typed by users.
pub fn normalize_item_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
