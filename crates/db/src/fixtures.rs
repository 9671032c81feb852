use chrono::{Days, NaiveDate};

use medstock_core::domain::inventory::{Batch, InventoryItem};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

struct SeedItem {
    name: &'static str,
    description: &'static str,
    quantity_in_stock: i64,
    reorder_level: i64,
}

struct SeedBatch {
    batch_number: &'static str,
    item: &'static str,
    quantity: i64,
    /// Days after the seeding date; negative values are already expired.
    expires_in_days: i64,
}

/// Several entries sit under their reorder level so `reorder_check` has something to report.
const SEED_ITEMS: &[SeedItem] = &[
    SeedItem {
        name: "surgical gloves",
        description: "Nitrile, powder free, box of 100",
        quantity_in_stock: 120,
        reorder_level: 50,
    },
    SeedItem {
        name: "IV fluids",
        description: "Normal saline 0.9%, 1L bags",
        quantity_in_stock: 18,
        reorder_level: 40,
    },
    SeedItem {
        name: "painkillers",
        description: "Paracetamol 500mg, blister packs",
        quantity_in_stock: 300,
        reorder_level: 100,
    },
    SeedItem {
        name: "antiseptics",
        description: "Povidone iodine 10%, 500ml",
        quantity_in_stock: 25,
        reorder_level: 20,
    },
    SeedItem {
        name: "cotton rolls",
        description: "Absorbent cotton, 500g",
        quantity_in_stock: 8,
        reorder_level: 15,
    },
    SeedItem {
        name: "scalpels",
        description: "Disposable, size 10",
        quantity_in_stock: 60,
        reorder_level: 30,
    },
    SeedItem {
        name: "face masks",
        description: "Surgical, three ply",
        quantity_in_stock: 45,
        reorder_level: 100,
    },
    SeedItem {
        name: "bandages",
        description: "Elastic crepe, 10cm",
        quantity_in_stock: 75,
        reorder_level: 40,
    },
    SeedItem {
        name: "hand sanitizer",
        description: "Alcohol based, 500ml pump",
        quantity_in_stock: 12,
        reorder_level: 25,
    },
    SeedItem {
        name: "syringes",
        description: "5ml, luer lock",
        quantity_in_stock: 500,
        reorder_level: 200,
    },
    SeedItem {
        name: "gauze",
        description: "Sterile swabs, 10x10cm",
        quantity_in_stock: 90,
        reorder_level: 50,
    },
];

const SEED_BATCHES: &[SeedBatch] = &[
    SeedBatch { batch_number: "IVF-2401", item: "IV fluids", quantity: 10, expires_in_days: 12 },
    SeedBatch { batch_number: "IVF-2402", item: "IV fluids", quantity: 8, expires_in_days: 95 },
    SeedBatch { batch_number: "PNK-2401", item: "painkillers", quantity: 300, expires_in_days: 40 },
    SeedBatch { batch_number: "ANT-2401", item: "antiseptics", quantity: 25, expires_in_days: 5 },
    SeedBatch {
        batch_number: "HSN-2401",
        item: "hand sanitizer",
        quantity: 12,
        expires_in_days: 21,
    },
    SeedBatch { batch_number: "SYR-2401", item: "syringes", quantity: 500, expires_in_days: 400 },
    SeedBatch { batch_number: "GAU-2401", item: "gauze", quantity: 90, expires_in_days: -3 },
];

/// Deterministic demo inventory for local runs and smoke tests.
///
/// Expiry dates are laid out relative to the date passed to [`DemoInventory::load`],
/// so `check_expiry` questions have matches within the default window.
pub struct DemoInventory;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub items_inserted: u64,
    pub batches_inserted: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl DemoInventory {
    /// Inserts missing demo rows; existing rows are left untouched.
    pub async fn load(pool: &DbPool, today: NaiveDate) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        let mut items_inserted = 0;
        let mut batches_inserted = 0;

        for item in SEED_ITEMS {
            items_inserted += sqlx::query(
                "INSERT INTO inventory_items (name, description, quantity_in_stock, reorder_level)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(name) DO NOTHING",
            )
            .bind(item.name)
            .bind(item.description)
            .bind(item.quantity_in_stock)
            .bind(item.reorder_level)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for batch in SEED_BATCHES {
            let expiry = expiry_for(today, batch.expires_in_days)?;
            batches_inserted += sqlx::query(
                "INSERT INTO batches (inventory_item_id, batch_number, quantity, expiry_date)
                 SELECT id, ?, ?, ? FROM inventory_items WHERE name = ? COLLATE NOCASE
                 ON CONFLICT(batch_number) DO NOTHING",
            )
            .bind(batch.batch_number)
            .bind(batch.quantity)
            .bind(expiry.format("%Y-%m-%d").to_string())
            .bind(batch.item)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(SeedResult { items_inserted, batches_inserted })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_ITEMS.len() + SEED_BATCHES.len());

        for item in SEED_ITEMS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE name = ?1 COLLATE NOCASE)",
            )
            .bind(item.name)
            .fetch_one(pool)
            .await?;
            checks.push((item.name, exists == 1));
        }

        for batch in SEED_BATCHES {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM batches WHERE batch_number = ?1)",
            )
            .bind(batch.batch_number)
            .fetch_one(pool)
            .await?;
            checks.push((batch.batch_number, exists == 1));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }

    /// Demo rows as domain values, for seeding an in-memory repository.
    pub fn snapshot(
        today: NaiveDate,
    ) -> Result<(Vec<InventoryItem>, Vec<Batch>), RepositoryError> {
        let items = SEED_ITEMS
            .iter()
            .map(|seed| InventoryItem {
                description: Some(seed.description.to_owned()),
                ..InventoryItem::new(seed.name, seed.quantity_in_stock, seed.reorder_level)
            })
            .collect();
        let batches = SEED_BATCHES
            .iter()
            .map(|seed| {
                Ok(Batch {
                    batch_number: seed.batch_number.to_owned(),
                    item: seed.item.to_owned(),
                    quantity: seed.quantity,
                    expiry_date: expiry_for(today, seed.expires_in_days)?,
                    active: true,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        Ok((items, batches))
    }
}

fn expiry_for(today: NaiveDate, offset_days: i64) -> Result<NaiveDate, RepositoryError> {
    let days = Days::new(offset_days.unsigned_abs());
    let shifted =
        if offset_days >= 0 { today.checked_add_days(days) } else { today.checked_sub_days(days) };
    shifted.ok_or_else(|| {
        RepositoryError::Decode(format!("expiry offset {offset_days} overflows from {today}"))
    })
}
