use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use medstock_db::{ping, DbPool};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub inventory: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let inventory = if database.status == "ready" {
        inventory_check(&state.db_pool).await
    } else {
        HealthCheck { status: "skipped", detail: "database unreachable".to_string() }
    };
    let ready = database.status == "ready" && inventory.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!(
                "medstock-server {} accepting chat requests",
                env!("CARGO_PKG_VERSION")
            ),
        },
        database,
        inventory,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

/// An empty catalogue is still healthy; a missing schema is not.
async fn inventory_check(pool: &DbPool) -> HealthCheck {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventory_items WHERE is_active = 1")
            .fetch_one(pool)
            .await;

    match count {
        Ok(count) => HealthCheck { status: "ready", detail: format!("{count} active items") },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("inventory schema unavailable: {error}"),
        },
    }
}
