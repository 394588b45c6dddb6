//! # Domain Types
//!
//! Record types exchanged with the hosted store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │ ProductSnapshot │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │   │  name           │       │
//! │  │  name           │   │  total          │   │  price          │       │
//! │  │  price          │   │  date           │   └────────▲────────┘       │
//! │  │  stock          │   │  products ──────┼────────────┘                │
//! │  └─────────────────┘   └─────────────────┘   (embedded, read-only)     │
//! │                                                                         │
//! │  Write shapes: NewProduct, ProductUpdate, NewSale                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The store generates every `id`. Serial keys come back as JSON numbers,
//! UUID keys as strings; [`RecordId`] accepts both.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Record Identifier
// =============================================================================

/// Identifier generated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RecordId {
    /// Serial / identity column.
    Int(i64),
    /// Text key (usually a UUID).
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<RecordId> for serde_json::Value {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(id) => serde_json::Value::from(id),
            RecordId::Text(id) => serde_json::Value::String(id),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product row from the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Store-generated identifier.
    pub id: RecordId,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: f64,

    /// Units on hand.
    pub stock: i64,
}

/// Insert payload for a product.
///
/// `id` is normally left empty so the store assigns one. Seeding scripts
/// may set it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<RecordId>,
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

impl NewProduct {
    /// Creates an insert payload with a store-generated id.
    pub fn new(name: impl Into<String>, price: f64, stock: i64) -> Self {
        NewProduct {
            id: None,
            name: name.into(),
            price,
            stock,
        }
    }

    /// Pins the id instead of letting the store generate one.
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Partial update for a product. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub stock: Option<i64>,
}

impl ProductUpdate {
    /// Update that only sets the stock level.
    pub fn stock(stock: i64) -> Self {
        ProductUpdate {
            stock: Some(stock),
            ..Default::default()
        }
    }

    /// Update that only sets the price.
    pub fn price(price: f64) -> Self {
        ProductUpdate {
            price: Some(price),
            ..Default::default()
        }
    }

    /// Update that only renames the product.
    pub fn name(name: impl Into<String>) -> Self {
        ProductUpdate {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Returns true when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Read-only projection of the product a sale refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: f64,
}

/// A sale row from the `sales` table.
///
/// ## Embedded Product
/// Reads request `*,products(name,price)`, so the related product comes
/// back nested under the related table's name.
/// ```text
/// { "id": 7, "product_id": 3, "total": 20.0, "date": "...",
///   "products": { "name": "Coffee", "price": 4.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: RecordId,

    /// The product that was sold.
    pub product_id: RecordId,

    /// Amount charged.
    pub total: f64,

    /// When the sale happened.
    ///
    /// Expects a `timestamptz` column: values without an offset
    /// (`timestamp` columns) fail to decode.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Embedded product projection, `None` if the store returned none.
    #[serde(rename = "products", default)]
    pub product: Option<ProductSnapshot>,
}

/// Insert payload for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub product_id: RecordId,
    pub total: f64,

    /// Left empty, the store stamps the insert time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

impl NewSale {
    /// Creates a sale dated by the store.
    pub fn new(product_id: impl Into<RecordId>, total: f64) -> Self {
        NewSale {
            product_id: product_id.into(),
            total,
            date: None,
        }
    }

    /// Sets an explicit sale date.
    pub fn dated(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
