//! # Store Client
//!
//! The capability every store backend implements: execute one [`Query`]
//! and hand back the rows, or the error the store reported.
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query::from_table("products")                                          │
//! │      .select("*")               ← columns returned                     │
//! │      .order("name", true)       ← ORDER BY name ASC                    │
//! │                                                                         │
//! │  Query::from_table("products")                                          │
//! │      .update(json!({"stock": 4}))                                       │
//! │      .eq("id", json!(7))        ← WHERE id = 7                         │
//! │      .select("*")               ← return the updated row               │
//! │                                                                         │
//! │  One Query = one round trip. Nothing is cached between queries.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

/// What a query does to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Select,
    Insert(Vec<Value>),
    Update(Value),
    Delete,
}

impl Operation {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert(_) => "insert",
            Operation::Update(_) => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Equality filter (`column = value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A single request against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    operation: Operation,
    columns: Option<String>,
    filters: Vec<Filter>,
    order: Option<Order>,
}

impl Query {
    /// Starts a query against `table`. Defaults to a select.
    pub fn from_table(table: impl Into<String>) -> Self {
        Query {
            table: table.into(),
            operation: Operation::Select,
            columns: None,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Columns to return. For writes this requests the affected rows back.
    ///
    /// Embedded relations use `relation(col, ...)`, e.g.
    /// `*,products(name,price)`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn insert(mut self, records: Vec<Value>) -> Self {
        self.operation = Operation::Insert(records);
        self
    }

    pub fn update(mut self, patch: Value) -> Self {
        self.operation = Operation::Update(patch);
        self
    }

    pub fn delete(mut self) -> Self {
        self.operation = Operation::Delete;
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn columns(&self) -> Option<&str> {
        self.columns.as_deref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order_by(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Whether the store should send rows back.
    ///
    /// Selects always do; writes only when `select` was called.
    pub fn returns_rows(&self) -> bool {
        matches!(self.operation, Operation::Select) || self.columns.is_some()
    }
}

/// A backend able to run queries against the store.
///
/// ## Implementations
/// - [`RestStore`](crate::rest::RestStore) - the hosted REST endpoint
/// - [`MemoryStore`](crate::memory::MemoryStore) - in-process tables
///
/// A response without a body (or a `null` one) is an empty row set, not an
/// error.
#[async_trait]
pub trait StoreClient: Debug + Send + Sync {
    async fn execute(&self, query: Query) -> StoreResult<Vec<Value>>;
}
