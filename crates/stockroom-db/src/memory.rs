//! # In-Memory Store
//!
//! [`StoreClient`] backed by in-process tables. It answers the queries the
//! repositories issue the way the hosted REST endpoint does, so they behave
//! the same against either backend.
//!
//! Only many-to-one embeds are resolved (`sales?select=*,products(..)`,
//! following a declared foreign key). Reverse one-to-many embeds such as
//! `products?select=*,sales(..)`, which the hosted store accepts, are
//! rejected with PGRST200.
//!
//! ## Behaviour Mirrored From The Hosted Store
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • Serial ids assigned on insert when the row has no `id`              │
//! │  • Duplicate `id`           → 409 / 23505                              │
//! │  • Dangling foreign key     → 409 / 23503 (insert, update, delete)     │
//! │  • Unknown table            → 404 / 42P01                              │
//! │  • Column defaults (e.g. sales.date = now())                           │
//! │  • Embedded relations: select("*,products(name,price)")                │
//! │  • ORDER BY with NULLS LAST ascending, NULLS FIRST descending          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Useful for tests and for running the seed binary without credentials.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{Filter, Operation, Order, Query, StoreClient};
use crate::error::{
    StoreError, StoreResult, FOREIGN_KEY_VIOLATION, UNDEFINED_TABLE, UNIQUE_VIOLATION,
};

type Row = Map<String, Value>;

/// Value filled in when an insert omits a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// Insert time as an RFC 3339 timestamp.
    Now,
    /// A fixed value.
    Value(Value),
}

#[derive(Debug, Clone, PartialEq)]
struct ForeignKey {
    column: String,
    references: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
    defaults: Vec<(String, ColumnDefault)>,
    foreign_keys: Vec<ForeignKey>,
}

impl Table {
    fn new() -> Self {
        Table {
            next_id: 1,
            ..Default::default()
        }
    }
}

/// In-process store.
///
/// ## Usage
/// ```rust,ignore
/// let store = MemoryStore::inventory();
/// let rows = store.execute(Query::from_table("products").select("*")).await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Creates a store with no tables.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates the `products` and `sales` tables.
    ///
    /// `sales.product_id` references `products`, `sales.date` defaults to
    /// the insert time.
    pub fn inventory() -> Self {
        MemoryStore::new()
            .with_table("products")
            .with_table("sales")
            .with_foreign_key("sales", "product_id", "products")
            .with_default("sales", "date", ColumnDefault::Now)
    }

    /// Adds an empty table.
    pub fn with_table(self, name: &str) -> Self {
        self.lock().entry(name.to_string()).or_insert_with(Table::new);
        self
    }

    /// Declares `table.column` as a reference to `references.id`.
    ///
    /// The relation is also what `select("references(...)")` embeds.
    pub fn with_foreign_key(self, table: &str, column: &str, references: &str) -> Self {
        self.lock()
            .entry(table.to_string())
            .or_insert_with(Table::new)
            .foreign_keys
            .push(ForeignKey {
                column: column.to_string(),
                references: references.to_string(),
            });
        self
    }

    /// Declares a default for `table.column`.
    pub fn with_default(self, table: &str, column: &str, default: ColumnDefault) -> Self {
        self.lock()
            .entry(table.to_string())
            .or_insert_with(Table::new)
            .defaults
            .push((column.to_string(), default));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Table>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(&self, query: &Query) -> StoreResult<Vec<Value>> {
        let mut tables = self.lock();

        if !tables.contains_key(query.table()) {
            return Err(StoreError::remote(
                404,
                UNDEFINED_TABLE,
                format!("relation \"public.{}\" does not exist", query.table()),
            ));
        }

        let affected = match query.operation() {
            Operation::Select => {
                let table = &tables[query.table()];
                let mut rows: Vec<Row> = table
                    .rows
                    .iter()
                    .filter(|row| matches_filters(row, query.filters()))
                    .cloned()
                    .collect();
                if let Some(order) = query.order_by() {
                    sort_rows(&mut rows, order);
                }
                rows
            }
            Operation::Insert(records) => insert_rows(&mut tables, query.table(), records)?,
            Operation::Update(patch) => {
                update_rows(&mut tables, query.table(), patch, query.filters())?
            }
            Operation::Delete => delete_rows(&mut tables, query.table(), query.filters())?,
        };

        if !query.returns_rows() {
            return Ok(Vec::new());
        }

        let columns = query.columns().unwrap_or("*");
        let selection = parse_columns(columns);
        affected
            .iter()
            .map(|row| project(&tables, query.table(), row, &selection).map(Value::Object))
            .collect()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn execute(&self, query: Query) -> StoreResult<Vec<Value>> {
        debug!(
            table = %query.table(),
            operation = query.operation().name(),
            "Running in-memory query"
        );
        self.run(&query)
    }
}

// =============================================================================
// Writes
// =============================================================================

fn insert_rows(
    tables: &mut HashMap<String, Table>,
    table_name: &str,
    records: &[Value],
) -> StoreResult<Vec<Row>> {
    let mut staged: Vec<Row> = Vec::with_capacity(records.len());
    let mut next_id = tables[table_name].next_id;

    for record in records {
        let mut row = as_row(record)?;

        match row.get("id") {
            None | Some(Value::Null) => {
                row.insert("id".to_string(), Value::from(next_id));
                next_id += 1;
            }
            Some(id) => {
                if let Some(explicit) = id.as_i64() {
                    next_id = next_id.max(explicit + 1);
                }
            }
        }

        let table = &tables[table_name];
        for (column, default) in &table.defaults {
            if row.get(column).map_or(true, Value::is_null) {
                row.insert(column.clone(), default_value(default));
            }
        }

        let id = row.get("id").cloned().unwrap_or(Value::Null);
        let duplicate = table
            .rows
            .iter()
            .chain(staged.iter())
            .any(|existing| existing.get("id").is_some_and(|other| values_equal(other, &id)));
        if duplicate {
            return Err(unique_violation(table_name, &id));
        }

        check_foreign_keys(tables, table_name, &row)?;
        staged.push(row);
    }

    let table = tables
        .get_mut(table_name)
        .ok_or_else(|| StoreError::no_rows(table_name))?;
    table.next_id = next_id;
    table.rows.extend(staged.iter().cloned());

    Ok(staged)
}

fn update_rows(
    tables: &mut HashMap<String, Table>,
    table_name: &str,
    patch: &Value,
    filters: &[Filter],
) -> StoreResult<Vec<Row>> {
    let patch = as_row(patch)?;

    // Constraints only apply to rows that are actually touched
    if !tables[table_name]
        .rows
        .iter()
        .any(|row| matches_filters(row, filters))
    {
        return Ok(Vec::new());
    }
    check_foreign_keys(tables, table_name, &patch)?;

    if let Some(new_id) = patch.get("id") {
        let clash = tables[table_name].rows.iter().any(|row| {
            !matches_filters(row, filters)
                && row.get("id").is_some_and(|id| values_equal(id, new_id))
        });
        if clash {
            return Err(unique_violation(table_name, new_id));
        }
    }

    let table = tables
        .get_mut(table_name)
        .ok_or_else(|| StoreError::no_rows(table_name))?;

    let mut updated = Vec::new();
    for row in table.rows.iter_mut().filter(|row| matches_filters(row, filters)) {
        for (column, value) in &patch {
            row.insert(column.clone(), value.clone());
        }
        updated.push(row.clone());
    }

    Ok(updated)
}

fn delete_rows(
    tables: &mut HashMap<String, Table>,
    table_name: &str,
    filters: &[Filter],
) -> StoreResult<Vec<Row>> {
    let doomed: Vec<&Value> = tables[table_name]
        .rows
        .iter()
        .filter(|row| matches_filters(row, filters))
        .filter_map(|row| row.get("id"))
        .collect();

    // ON DELETE RESTRICT
    for (referencing_name, referencing) in tables.iter() {
        for fk in referencing.foreign_keys.iter().filter(|fk| fk.references == table_name) {
            let still_referenced = referencing.rows.iter().find_map(|row| {
                let value = row.get(&fk.column)?;
                doomed.iter().find(|id| values_equal(id, value))
            });

            if let Some(id) = still_referenced {
                return Err(StoreError::Remote {
                    status: 409,
                    code: Some(FOREIGN_KEY_VIOLATION.to_string()),
                    message: format!(
                        "update or delete on table \"{}\" violates foreign key constraint \"{}_{}_fkey\" on table \"{}\"",
                        table_name, referencing_name, fk.column, referencing_name
                    ),
                    details: Some(format!(
                        "Key (id)=({}) is still referenced from table \"{}\".",
                        display_value(id),
                        referencing_name
                    )),
                    hint: None,
                });
            }
        }
    }

    let table = tables
        .get_mut(table_name)
        .ok_or_else(|| StoreError::no_rows(table_name))?;
    let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut table.rows)
        .into_iter()
        .partition(|row| matches_filters(row, filters));
    table.rows = kept;

    Ok(removed)
}

fn as_row(value: &Value) -> StoreResult<Row> {
    match value {
        Value::Object(row) => Ok(row.clone()),
        _ => Err(StoreError::remote(
            400,
            "PGRST102",
            "All object keys must match",
        )),
    }
}

fn default_value(default: &ColumnDefault) -> Value {
    match default {
        ColumnDefault::Now => Value::String(Utc::now().to_rfc3339()),
        ColumnDefault::Value(value) => value.clone(),
    }
}

fn check_foreign_keys(
    tables: &HashMap<String, Table>,
    table_name: &str,
    row: &Row,
) -> StoreResult<()> {
    for fk in &tables[table_name].foreign_keys {
        let Some(value) = row.get(&fk.column) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let exists = tables.get(&fk.references).is_some_and(|referenced| {
            referenced
                .rows
                .iter()
                .any(|candidate| candidate.get("id").is_some_and(|id| values_equal(id, value)))
        });

        if !exists {
            return Err(StoreError::Remote {
                status: 409,
                code: Some(FOREIGN_KEY_VIOLATION.to_string()),
                message: format!(
                    "insert or update on table \"{}\" violates foreign key constraint \"{}_{}_fkey\"",
                    table_name, table_name, fk.column
                ),
                details: Some(format!(
                    "Key ({})=({}) is not present in table \"{}\".",
                    fk.column,
                    display_value(value),
                    fk.references
                )),
                hint: None,
            });
        }
    }
    Ok(())
}

fn unique_violation(table_name: &str, id: &Value) -> StoreError {
    StoreError::Remote {
        status: 409,
        code: Some(UNIQUE_VIOLATION.to_string()),
        message: format!(
            "duplicate key value violates unique constraint \"{}_pkey\"",
            table_name
        ),
        details: Some(format!("Key (id)=({}) already exists.", display_value(id))),
        hint: None,
    }
}

// =============================================================================
// Reads
// =============================================================================

/// One entry of a `select` column list.
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    All,
    Column(String),
    Embed {
        relation: String,
        columns: Vec<Selection>,
    },
}

/// Parses `*,products(name,price)` into selections.
fn parse_columns(columns: &str) -> Vec<Selection> {
    split_top_level(columns)
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(|item| match (item.find('('), item.ends_with(')')) {
            (Some(open), true) => Selection::Embed {
                relation: item[..open].trim().to_string(),
                columns: parse_columns(&item[open + 1..item.len() - 1]),
            },
            _ if item == "*" => Selection::All,
            _ => Selection::Column(item.to_string()),
        })
        .collect()
}

/// Splits on commas outside parentheses, dropping whitespace.
fn split_top_level(columns: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in columns.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => items.push(std::mem::take(&mut current)),
            c if c.is_whitespace() => {}
            c => current.push(c),
        }
    }
    items.push(current);
    items
}

fn project(
    tables: &HashMap<String, Table>,
    table_name: &str,
    row: &Row,
    selection: &[Selection],
) -> StoreResult<Row> {
    let mut projected = Row::new();

    for item in selection {
        match item {
            Selection::All => {
                for (column, value) in row {
                    projected.insert(column.clone(), value.clone());
                }
            }
            Selection::Column(column) => {
                projected.insert(
                    column.clone(),
                    row.get(column).cloned().unwrap_or(Value::Null),
                );
            }
            Selection::Embed { relation, columns } => {
                let fk = tables[table_name]
                    .foreign_keys
                    .iter()
                    .find(|fk| &fk.references == relation)
                    .ok_or_else(|| {
                        StoreError::remote(
                            400,
                            "PGRST200",
                            format!(
                                "Could not find a relationship between '{}' and '{}' in the schema cache",
                                table_name, relation
                            ),
                        )
                    })?;

                let related = row.get(&fk.column).and_then(|key| {
                    tables.get(relation).and_then(|referenced| {
                        referenced
                            .rows
                            .iter()
                            .find(|candidate| candidate.get("id").is_some_and(|id| values_equal(id, key)))
                    })
                });

                let embedded = match related {
                    Some(related) => Value::Object(project(tables, relation, related, columns)?),
                    None => Value::Null,
                };
                projected.insert(relation.clone(), embedded);
            }
        }
    }

    Ok(projected)
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        row.get(&filter.column)
            .is_some_and(|value| values_equal(value, &filter.value))
    })
}

fn sort_rows(rows: &mut [Row], order: &Order) {
    rows.sort_by(|a, b| {
        let ordering = compare_nullable(a.get(&order.column), b.get(&order.column));
        if order.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

/// NULL sorts above every value, as in Postgres.
fn compare_nullable(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Equality with numeric widening (`1` equals `1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn insert(store: &MemoryStore, table: &str, row: Value) -> StoreResult<Vec<Value>> {
        store
            .execute(Query::from_table(table).insert(vec![row]).select("*"))
            .await
    }

    #[tokio::test]
    async fn test_insert_assigns_serial_ids() {
        let store = MemoryStore::inventory();

        let first = insert(&store, "products", json!({ "name": "A", "price": 1.0, "stock": 1 }))
            .await
            .unwrap();
        let second = insert(&store, "products", json!({ "name": "B", "price": 1.0, "stock": 1 }))
            .await
            .unwrap();

        assert_eq!(first[0]["id"], json!(1));
        assert_eq!(second[0]["id"], json!(2));
    }

    #[tokio::test]
    async fn test_explicit_id_advances_sequence() {
        let store = MemoryStore::inventory();

        insert(&store, "products", json!({ "id": 10, "name": "A" })).await.unwrap();
        let next = insert(&store, "products", json!({ "name": "B" })).await.unwrap();

        assert_eq!(next[0]["id"], json!(11));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let store = MemoryStore::inventory();
        insert(&store, "products", json!({ "id": 1, "name": "A" })).await.unwrap();

        let err = insert(&store, "products", json!({ "id": 1, "name": "B" }))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        let rows = store
            .execute(Query::from_table("products").select("*"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_batch_inserts_nothing() {
        let store = MemoryStore::inventory();

        let err = store
            .execute(
                Query::from_table("products")
                    .insert(vec![json!({ "id": 1, "name": "A" }), json!({ "id": 1, "name": "B" })]),
            )
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        let rows = store.execute(Query::from_table("products")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_key_enforced() {
        let store = MemoryStore::inventory();

        let err = insert(&store, "sales", json!({ "product_id": 99, "total": 5.0 }))
            .await
            .unwrap_err();

        assert!(err.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn test_default_date_and_embedded_product() {
        let store = MemoryStore::inventory();
        insert(&store, "products", json!({ "name": "Coffee", "price": 3.5, "stock": 2 }))
            .await
            .unwrap();

        let rows = store
            .execute(
                Query::from_table("sales")
                    .insert(vec![json!({ "product_id": 1, "total": 7.0 })])
                    .select("*, products(name, price)"),
            )
            .await
            .unwrap();

        assert!(rows[0]["date"].is_string());
        assert_eq!(rows[0]["products"], json!({ "name": "Coffee", "price": 3.5 }));
    }

    #[tokio::test]
    async fn test_reverse_embed_is_not_supported() {
        let store = MemoryStore::inventory();

        // Nothing to project yet, so the bad relation goes unnoticed.
        let rows = store
            .execute(Query::from_table("products").select("*,sales(total)"))
            .await
            .unwrap();
        assert!(rows.is_empty());

        insert(&store, "products", json!({ "name": "A" })).await.unwrap();
        let err = store
            .execute(Query::from_table("products").select("*,sales(total)"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("PGRST200"));
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = MemoryStore::new();

        let err = store
            .execute(Query::from_table("products").select("*"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(UNDEFINED_TABLE));
    }

    #[tokio::test]
    async fn test_projection_and_order() {
        let store = MemoryStore::inventory();
        for (name, stock) in [("b", 1), ("c", 3), ("a", 2)] {
            insert(&store, "products", json!({ "name": name, "stock": stock }))
                .await
                .unwrap();
        }

        let rows = store
            .execute(Query::from_table("products").select("stock").order("name", true))
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "stock": 2 }), json!({ "stock": 1 }), json!({ "stock": 3 })]);
    }

    #[tokio::test]
    async fn test_descending_puts_nulls_first() {
        let store = MemoryStore::new().with_table("t");
        for date in [json!("2026-01-01T00:00:00Z"), Value::Null, json!("2026-02-01T00:00:00+00:00")] {
            insert(&store, "t", json!({ "date": date })).await.unwrap();
        }

        let rows = store
            .execute(Query::from_table("t").select("id").order("date", false))
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "id": 2 }), json!({ "id": 3 }), json!({ "id": 1 })]);
    }

    #[tokio::test]
    async fn test_update_without_match_skips_foreign_key_check() {
        let store = MemoryStore::inventory();

        let rows = store
            .execute(
                Query::from_table("sales")
                    .update(json!({ "product_id": 99 }))
                    .eq("id", 1)
                    .select("*"),
            )
            .await
            .unwrap();
        assert!(rows.is_empty());

        insert(&store, "products", json!({ "name": "A" })).await.unwrap();
        insert(&store, "sales", json!({ "product_id": 1, "total": 1.0 })).await.unwrap();
        let err = store
            .execute(
                Query::from_table("sales")
                    .update(json!({ "product_id": 99 }))
                    .eq("id", 1),
            )
            .await
            .unwrap_err();
        assert!(err.is_foreign_key_violation());
    }

    #[tokio::test]
    async fn test_update_and_delete_by_filter() {
        let store = MemoryStore::inventory();
        insert(&store, "products", json!({ "name": "A", "stock": 1 })).await.unwrap();
        insert(&store, "products", json!({ "name": "B", "stock": 1 })).await.unwrap();

        let updated = store
            .execute(
                Query::from_table("products")
                    .update(json!({ "stock": 0 }))
                    .eq("id", 2)
                    .select("*"),
            )
            .await
            .unwrap();
        assert_eq!(updated, vec![json!({ "id": 2, "name": "B", "stock": 0 })]);

        let deleted = store
            .execute(Query::from_table("products").delete().eq("id", 1))
            .await
            .unwrap();
        assert!(deleted.is_empty());

        let rows = store.execute(Query::from_table("products")).await.unwrap();
        assert_eq!(rows, vec![json!({ "id": 2, "name": "B", "stock": 0 })]);
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(
            parse_columns("*, products(name, price)"),
            vec![
                Selection::All,
                Selection::Embed {
                    relation: "products".to_string(),
                    columns: vec![
                        Selection::Column("name".to_string()),
                        Selection::Column("price".to_string())
                    ],
                }
            ]
        );
    }

    #[test]
    fn test_values_equal_widens_numbers() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }
}
