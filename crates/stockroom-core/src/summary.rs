//! # Inventory Summary
//!
//! Derived metrics over the full sales and product sets.
//!
//! ## Fold
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales.total   [10.5, 20, 5.25]   ──sum──►  total_sales       = 35.75  │
//! │  products.stock [0, 5, 3, 0]      ──sum──►  total_stock       = 8      │
//! │                                   ──>0───►  products_in_stock = 2      │
//! │                                   ──len──►  total_products    = 4      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is persisted. The summary is recomputed on every request.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Projection of a sale row holding only `total`.
///
/// A `null` total counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleTotal {
    #[serde(default)]
    pub total: Option<f64>,
}

impl SaleTotal {
    pub fn new(total: f64) -> Self {
        SaleTotal { total: Some(total) }
    }
}

/// Projection of a product row holding only `stock`.
///
/// A `null` stock is not in stock but still counts as a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStock {
    #[serde(default)]
    pub stock: Option<i64>,
}

impl ProductStock {
    pub fn new(stock: i64) -> Self {
        ProductStock { stock: Some(stock) }
    }

    /// Checks if at least one unit is on hand.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock.is_some_and(|stock| stock > 0)
    }
}

/// Inventory and sales totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Summary {
    /// Sum of every sale total.
    pub total_sales: f64,

    /// Sum of every product's stock.
    pub total_stock: i64,

    /// Products with stock above zero.
    pub products_in_stock: u64,

    /// Every product row.
    pub total_products: u64,
}

impl Summary {
    /// Folds the two projections into a summary.
    ///
    /// Empty inputs produce zeros.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::summary::{ProductStock, SaleTotal, Summary};
    ///
    /// let sales = [SaleTotal::new(10.5), SaleTotal::new(20.0), SaleTotal::new(5.25)];
    /// let products = [ProductStock::new(0), ProductStock::new(5), ProductStock::new(3)];
    ///
    /// let summary = Summary::from_rows(&sales, &products);
    /// assert_eq!(summary.total_sales, 35.75);
    /// assert_eq!(summary.total_stock, 8);
    /// assert_eq!(summary.products_in_stock, 2);
    /// assert_eq!(summary.total_products, 3);
    /// ```
    pub fn from_rows(sales: &[SaleTotal], products: &[ProductStock]) -> Self {
        let total_sales = sales
            .iter()
            .filter_map(|sale| sale.total)
            .fold(0.0, |sum, total| sum + total);

        // Saturates instead of overflowing on bigint stock columns
        let total_stock = products
            .iter()
            .filter_map(|product| product.stock)
            .fold(0i64, i64::saturating_add);

        let products_in_stock = products
            .iter()
            .filter(|product| product.in_stock())
            .count() as u64;

        Summary {
            total_sales,
            total_stock,
            products_in_stock,
            total_products: products.len() as u64,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
