//! # Record Gateway
//!
//! Generic CRUD over any table. Each call is one round trip; the store's
//! error is returned as soon as it comes back.
//!
//! ## Operations
//! ```text
//! list_all(table, columns, order, asc)   → Vec<T>
//! select(table, columns)                 → Vec<T>
//! insert(table, record, columns)         → T        (first returned row)
//! update_by_id(table, id, patch, cols)   → T        (NoRows if nothing matched)
//! delete_by_id(table, id)                → ()       (no existence check)
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use stockroom_core::RecordId;

use crate::client::{Query, StoreClient};
use crate::error::{StoreError, StoreResult};

/// CRUD helper shared by the repositories.
#[derive(Debug, Clone)]
pub struct RecordGateway {
    client: Arc<dyn StoreClient>,
}

impl RecordGateway {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        RecordGateway { client }
    }

    /// Fetches every row, ordered by `order_field`.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        order_field: &str,
        ascending: bool,
    ) -> StoreResult<Vec<T>> {
        debug!(table = %table, order = %order_field, ascending, "Listing rows");

        let rows = self
            .client
            .execute(
                Query::from_table(table)
                    .select(columns)
                    .order(order_field, ascending),
            )
            .await?;

        debug!(table = %table, count = rows.len(), "Listed rows");
        decode_rows(rows)
    }

    /// Fetches every row in store order.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
    ) -> StoreResult<Vec<T>> {
        let rows = self
            .client
            .execute(Query::from_table(table).select(columns))
            .await?;
        decode_rows(rows)
    }

    /// Inserts one record and returns the created row.
    pub async fn insert<R, T>(&self, table: &str, record: &R, columns: &str) -> StoreResult<T>
    where
        R: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table = %table, "Inserting row");

        let record = serde_json::to_value(record)?;
        let rows = self
            .client
            .execute(Query::from_table(table).insert(vec![record]).select(columns))
            .await?;

        first_row(table, rows)
    }

    /// Applies a partial update to the row with `id` and returns it.
    pub async fn update_by_id<P, T>(
        &self,
        table: &str,
        id: &RecordId,
        patch: &P,
        columns: &str,
    ) -> StoreResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table = %table, id = %id, "Updating row");

        let patch = serde_json::to_value(patch)?;
        let rows = self
            .client
            .execute(
                Query::from_table(table)
                    .update(patch)
                    .eq("id", id.clone())
                    .select(columns),
            )
            .await?;

        first_row(table, rows)
    }

    /// Deletes the row with `id`. Succeeds when nothing matched.
    pub async fn delete_by_id(&self, table: &str, id: &RecordId) -> StoreResult<()> {
        debug!(table = %table, id = %id, "Deleting row");

        self.client
            .execute(Query::from_table(table).delete().eq("id", id.clone()))
            .await?;

        Ok(())
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

fn first_row<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> StoreResult<T> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::no_rows(table))?;
    Ok(serde_json::from_value(row)?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn gateway() -> RecordGateway {
        RecordGateway::new(Arc::new(MemoryStore::inventory()))
    }

    #[tokio::test]
    async fn test_insert_returns_created_row() {
        let gateway = gateway();

        let row: Value = gateway
            .insert("products", &json!({ "name": "Tea", "price": 2.0, "stock": 1 }), "*")
            .await
            .unwrap();

        assert_eq!(row["id"], json!(1));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_no_rows() {
        let gateway = gateway();

        let err = gateway
            .update_by_id::<_, Value>("products", &RecordId::Int(42), &json!({ "stock": 1 }), "*")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NoRows { table } if table == "products"));
    }

    #[tokio::test]
    async fn test_delete_missing_row_succeeds() {
        let gateway = gateway();

        gateway
            .delete_by_id("products", &RecordId::Int(42))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let gateway = gateway();
        gateway
            .insert::<_, Value>("products", &json!({ "name": "Tea" }), "*")
            .await
            .unwrap();

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            price: f64,
        }

        let err = gateway
            .list_all::<Strict>("products", "*", "name", true)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_remote_error_propagates_unchanged() {
        let gateway = RecordGateway::new(Arc::new(MemoryStore::new()));

        let err = gateway
            .select::<Value>("products", "*")
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(crate::error::UNDEFINED_TABLE));
    }
}
