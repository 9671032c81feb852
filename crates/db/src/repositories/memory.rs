use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use medstock_core::domain::inventory::{
    normalize_item_name, Batch, ExpiringBatch, InventoryItem, LowStockItem,
};
use medstock_core::store::{InventoryStore, StoreError};

/// Process-local inventory keyed by normalized item name.
#[derive(Default)]
pub struct InMemoryInventoryRepository {
    items: RwLock<HashMap<String, InventoryItem>>,
    batches: RwLock<Vec<Batch>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(items: Vec<InventoryItem>, batches: Vec<Batch>) -> Self {
        let items = items.into_iter().map(|item| (normalize_item_name(&item.name), item)).collect();
        Self { items: RwLock::new(items), batches: RwLock::new(batches) }
    }

    pub async fn insert_item(&self, item: InventoryItem) {
        self.items.write().await.insert(normalize_item_name(&item.name), item);
    }

    pub async fn insert_batch(&self, batch: Batch) {
        self.batches.write().await.push(batch);
    }

    async fn update(&self, item: &str, apply: impl FnOnce(&mut InventoryItem)) -> bool {
        let mut items = self.items.write().await;
        match items.get_mut(&normalize_item_name(item)) {
            Some(found) if found.active => {
                apply(found);
                true
            }
            _ => false,
        }
    }
}

fn reject_negative(field: &str, value: i64) -> Result<(), StoreError> {
    if value < 0 {
        return Err(StoreError::Rejected(format!("{field} must not be negative, got {value}")));
    }
    Ok(())
}

#[async_trait::async_trait]
impl InventoryStore for InMemoryInventoryRepository {
    async fn stock_level(&self, item: &str) -> Result<Option<i64>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .get(&normalize_item_name(item))
            .filter(|found| found.active)
            .map(|found| found.quantity_in_stock))
    }

    async fn items_below_threshold(&self) -> Result<Vec<LowStockItem>, StoreError> {
        let items = self.items.read().await;
        let mut low = items
            .values()
            .filter(|item| item.active && item.below_threshold())
            .map(|item| LowStockItem {
                item: item.name.clone(),
                quantity: item.quantity_in_stock,
                threshold: item.reorder_level,
            })
            .collect::<Vec<_>>();
        low.sort_by_key(|entry| normalize_item_name(&entry.item));
        Ok(low)
    }

    async fn expiring_by(&self, date: NaiveDate) -> Result<Vec<ExpiringBatch>, StoreError> {
        let items = self.items.read().await;
        let batches = self.batches.read().await;
        let mut expiring = batches
            .iter()
            .filter(|batch| batch.active && batch.expiry_date <= date)
            .filter_map(|batch| {
                let item = items.get(&normalize_item_name(&batch.item))?;
                item.active.then(|| ExpiringBatch {
                    item: item.name.clone(),
                    expiry_date: batch.expiry_date,
                })
            })
            .collect::<Vec<_>>();
        expiring.sort_by(|a, b| {
            a.expiry_date
                .cmp(&b.expiry_date)
                .then_with(|| normalize_item_name(&a.item).cmp(&normalize_item_name(&b.item)))
        });
        Ok(expiring)
    }

    async fn set_threshold(&self, item: &str, threshold: i64) -> Result<bool, StoreError> {
        reject_negative("reorder level", threshold)?;
        Ok(self.update(item, |found| found.reorder_level = threshold).await)
    }

    async fn set_stock(&self, item: &str, quantity: i64) -> Result<bool, StoreError> {
        reject_negative("quantity in stock", quantity)?;
        Ok(self.update(item, |found| found.quantity_in_stock = quantity).await)
    }
}
