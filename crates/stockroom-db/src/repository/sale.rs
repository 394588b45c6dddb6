//! # Sale Repository
//!
//! Store operations for the `sales` table.
//!
//! Sales are read and created together with a projection of the product
//! they refer to, in the same request:
//! ```text
//! GET  sales?select=*,products(name,price)&order=date.desc
//! POST sales?select=*,products(name,price)
//! ```
//! Sales are never updated or deleted through this repository.

use stockroom_core::{NewSale, Sale};

use crate::error::StoreResult;
use crate::gateway::RecordGateway;

/// Table holding sales.
pub const SALES_TABLE: &str = "sales";

/// Sale columns plus the embedded product name and price.
pub const SALE_COLUMNS: &str = "*,products(name,price)";

/// Repository for sale store operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    gateway: RecordGateway,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(gateway: RecordGateway) -> Self {
        SaleRepository { gateway }
    }

    /// Lists every sale, newest first.
    pub async fn get_all(&self) -> StoreResult<Vec<Sale>> {
        self.gateway
            .list_all(SALES_TABLE, SALE_COLUMNS, "date", false)
            .await
    }

    /// Records a sale.
    ///
    /// A `product_id` the store does not know is rejected by its foreign
    /// key, see [`StoreError::is_foreign_key_violation`](crate::StoreError::is_foreign_key_violation).
    pub async fn create(&self, sale: &NewSale) -> StoreResult<Sale> {
        self.gateway.insert(SALES_TABLE, sale, SALE_COLUMNS).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
