use chrono::NaiveDate;
use sqlx::Row;
use tracing::debug;

use medstock_core::domain::inventory::{ExpiringBatch, LowStockItem};
use medstock_core::store::{InventoryStore, StoreError};

use super::RepositoryError;
use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqlInventoryRepository {
    pool: DbPool,
}

impl SqlInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch_stock_level(&self, item: &str) -> Result<Option<i64>, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i64>(
            "SELECT quantity_in_stock FROM inventory_items
             WHERE name = ? COLLATE NOCASE AND is_active = 1",
        )
        .bind(item.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(quantity)
    }

    async fn fetch_below_threshold(&self) -> Result<Vec<LowStockItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT name, quantity_in_stock, reorder_level FROM inventory_items
             WHERE is_active = 1 AND quantity_in_stock < reorder_level
             ORDER BY name COLLATE NOCASE ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_low_stock).collect()
    }

    async fn fetch_expiring_by(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ExpiringBatch>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT i.name AS name, b.expiry_date AS expiry_date
             FROM batches b
             JOIN inventory_items i ON i.id = b.inventory_item_id
             WHERE b.is_active = 1 AND i.is_active = 1 AND b.expiry_date <= ?
             ORDER BY b.expiry_date ASC, i.name COLLATE NOCASE ASC",
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_expiring).collect()
    }

    async fn update_column(
        &self,
        statement: &'static str,
        item: &str,
        value: i64,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query(statement).bind(value).bind(item.trim()).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_low_stock(row: &sqlx::sqlite::SqliteRow) -> Result<LowStockItem, RepositoryError> {
    let item: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity_in_stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let threshold: i64 =
        row.try_get("reorder_level").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    Ok(LowStockItem { item, quantity, threshold })
}

fn row_to_expiring(row: &sqlx::sqlite::SqliteRow) -> Result<ExpiringBatch, RepositoryError> {
    let item: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let raw_date: String =
        row.try_get("expiry_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expiry_date = NaiveDate::parse_from_str(&raw_date, DATE_FORMAT).map_err(|error| {
        RepositoryError::Decode(format!("batch expiry `{raw_date}` for {item}: {error}"))
    })?;
    Ok(ExpiringBatch { item, expiry_date })
}

#[async_trait::async_trait]
impl InventoryStore for SqlInventoryRepository {
    async fn stock_level(&self, item: &str) -> Result<Option<i64>, StoreError> {
        let quantity = self.fetch_stock_level(item).await?;
        debug!(event_name = "db.inventory.stock_level", item, found = quantity.is_some());
        Ok(quantity)
    }

    async fn items_below_threshold(&self) -> Result<Vec<LowStockItem>, StoreError> {
        let items = self.fetch_below_threshold().await?;
        debug!(event_name = "db.inventory.below_threshold", count = items.len());
        Ok(items)
    }

    async fn expiring_by(&self, date: NaiveDate) -> Result<Vec<ExpiringBatch>, StoreError> {
        let batches = self.fetch_expiring_by(date).await?;
        debug!(event_name = "db.inventory.expiring_by", %date, count = batches.len());
        Ok(batches)
    }

    async fn set_threshold(&self, item: &str, threshold: i64) -> Result<bool, StoreError> {
        let updated = self
            .update_column(
                "UPDATE inventory_items
                 SET reorder_level = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
                 WHERE name = ? COLLATE NOCASE AND is_active = 1",
                item,
                threshold,
            )
            .await?;
        debug!(event_name = "db.inventory.set_threshold", item, threshold, updated);
        Ok(updated)
    }

    async fn set_stock(&self, item: &str, quantity: i64) -> Result<bool, StoreError> {
        let updated = self
            .update_column(
                "UPDATE inventory_items
                 SET quantity_in_stock = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
                 WHERE name = ? COLLATE NOCASE AND is_active = 1",
                item,
                quantity,
            )
            .await?;
        debug!(event_name = "db.inventory.set_stock", item, quantity, updated);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use medstock_core::domain::inventory::{ExpiringBatch, LowStockItem};
    use medstock_core::store::{InventoryStore, StoreError};

    use super::SqlInventoryRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    async fn insert_item(pool: &sqlx::SqlitePool, name: &str, quantity: i64, reorder: i64) -> i64 {
        sqlx::query(
            "INSERT INTO inventory_items (name, quantity_in_stock, reorder_level) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(quantity)
        .bind(reorder)
        .execute(pool)
        .await
        .expect("insert item")
        .last_insert_rowid()
    }

    async fn insert_batch(pool: &sqlx::SqlitePool, item_id: i64, number: &str, expiry: &str) {
        sqlx::query(
            "INSERT INTO batches (inventory_item_id, batch_number, quantity, expiry_date)
             VALUES (?, ?, 10, ?)",
        )
        .bind(item_id)
        .bind(number)
        .bind(expiry)
        .execute(pool)
        .await
        .expect("insert batch");
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[tokio::test]
    async fn stock_level_matches_names_case_insensitively() {
        let pool = setup().await;
        insert_item(&pool, "Surgical Gloves", 120, 50).await;
        let repo = SqlInventoryRepository::new(pool);

        assert_eq!(repo.stock_level("surgical gloves").await.expect("lookup"), Some(120));
        assert_eq!(repo.stock_level("  SURGICAL GLOVES ").await.expect("lookup"), Some(120));
        assert_eq!(repo.stock_level("bandages").await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn inactive_items_are_invisible() {
        let pool = setup().await;
        insert_item(&pool, "gauze", 40, 10).await;
        sqlx::query("UPDATE inventory_items SET is_active = 0 WHERE name = 'gauze'")
            .execute(&pool)
            .await
            .expect("deactivate");
        let repo = SqlInventoryRepository::new(pool);

        assert_eq!(repo.stock_level("gauze").await.expect("lookup"), None);
        assert!(!repo.set_stock("gauze", 5).await.expect("update"));
    }

    #[tokio::test]
    async fn below_threshold_is_strict_and_sorted() {
        let pool = setup().await;
        insert_item(&pool, "syringes", 5, 10).await;
        insert_item(&pool, "masks", 30, 100).await;
        insert_item(&pool, "gauze", 10, 10).await;
        let repo = SqlInventoryRepository::new(pool);

        let items = repo.items_below_threshold().await.expect("query");
        assert_eq!(
            items,
            vec![
                LowStockItem { item: "masks".to_owned(), quantity: 30, threshold: 100 },
                LowStockItem { item: "syringes".to_owned(), quantity: 5, threshold: 10 },
            ]
        );
    }

    #[tokio::test]
    async fn expiring_by_includes_the_cutoff_day_in_expiry_order() {
        let pool = setup().await;
        let masks = insert_item(&pool, "masks", 30, 10).await;
        let gauze = insert_item(&pool, "gauze", 30, 10).await;
        insert_batch(&pool, masks, "M-2", "2024-12-31").await;
        insert_batch(&pool, gauze, "G-1", "2024-12-20").await;
        insert_batch(&pool, masks, "M-1", "2024-12-01").await;
        let repo = SqlInventoryRepository::new(pool);

        let batches = repo.expiring_by(date(2024, 12, 20)).await.expect("query");
        assert_eq!(
            batches,
            vec![
                ExpiringBatch { item: "masks".to_owned(), expiry_date: date(2024, 12, 1) },
                ExpiringBatch { item: "gauze".to_owned(), expiry_date: date(2024, 12, 20) },
            ]
        );
    }

    #[tokio::test]
    async fn malformed_expiry_dates_are_reported() {
        let pool = setup().await;
        let masks = insert_item(&pool, "masks", 30, 10).await;
        insert_batch(&pool, masks, "M-1", "2024-1").await;
        let repo = SqlInventoryRepository::new(pool);

        let error = repo.expiring_by(date(2024, 12, 20)).await.expect_err("malformed date");
        assert!(matches!(error, StoreError::Malformed(_)));
    }

    #[tokio::test]
    async fn mutations_report_whether_an_item_matched() {
        let pool = setup().await;
        insert_item(&pool, "masks", 30, 10).await;
        let repo = SqlInventoryRepository::new(pool);

        assert!(repo.set_threshold("Masks", 20).await.expect("alert"));
        assert!(repo.set_stock("masks", 15).await.expect("stock"));
        assert!(!repo.set_stock("ventilators", 1).await.expect("unknown item"));

        assert_eq!(repo.stock_level("masks").await.expect("lookup"), Some(15));
        let low = repo.items_below_threshold().await.expect("query");
        assert_eq!(low[0].threshold, 20);
    }

    #[tokio::test]
    async fn negative_stock_is_rejected() {
        let pool = setup().await;
        insert_item(&pool, "masks", 30, 10).await;
        let repo = SqlInventoryRepository::new(pool);

        assert!(repo.set_stock("masks", -4).await.is_err());
        assert_eq!(repo.stock_level("masks").await.expect("lookup"), Some(30));
    }
}
