//! # Summary Repository
//!
//! Computes [`Summary`] from two fresh reads.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   GET sales?select=total        GET products?select=stock               │
//! │            │   (issued together)            │                           │
//! │            ▼                                ▼                           │
//! │   sales error? ──► return it     products error? ──► return it          │
//! │            │      (checked first)           │                           │
//! │            └──────────────┬─────────────────┘                           │
//! │                           ▼                                             │
//! │                 Summary::from_rows(..)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! When both reads fail, only the sales error is returned.

use tracing::debug;

use stockroom_core::{ProductStock, SaleTotal, Summary};

use crate::error::StoreResult;
use crate::gateway::RecordGateway;
use crate::repository::product::PRODUCTS_TABLE;
use crate::repository::sale::SALES_TABLE;

/// Read-only aggregate over sales and products.
#[derive(Debug, Clone)]
pub struct SummaryRepository {
    gateway: RecordGateway,
}

impl SummaryRepository {
    pub fn new(gateway: RecordGateway) -> Self {
        SummaryRepository { gateway }
    }

    /// Recomputes the summary. Nothing is cached.
    pub async fn get_summary(&self) -> StoreResult<Summary> {
        let (sales, products) = tokio::join!(
            self.gateway.select::<SaleTotal>(SALES_TABLE, "total"),
            self.gateway.select::<ProductStock>(PRODUCTS_TABLE, "stock"),
        );

        // Sales first: its error wins when both reads fail.
        let sales = sales?;
        let products = products?;

        let summary = Summary::from_rows(&sales, &products);
        debug!(
            total_sales = summary.total_sales,
            total_products = summary.total_products,
            "Computed summary"
        );
        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
