//! # REST Store Client
//!
//! [`StoreClient`] over the hosted database's REST endpoint.
//!
//! ## Request Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query                          HTTP                                    │
//! │  ─────────────────────────────  ────────────────────────────────────    │
//! │  from_table("products")         {url}/rest/v1/products                  │
//! │  select("*")                    ?select=*                               │
//! │  eq("id", 7)                    &id=eq.7                                │
//! │  order("name", true)            &order=name.asc                         │
//! │                                                                         │
//! │  Select                         GET                                     │
//! │  Insert(rows)                   POST   [rows]     Prefer: return=...    │
//! │  Update(patch)                  PATCH  {patch}    Prefer: return=...    │
//! │  Delete                         DELETE            Prefer: return=...    │
//! │                                                                         │
//! │  Every request: apikey: {key}, Authorization: Bearer {key}              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::client::{Operation, Query, StoreClient};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

const REST_PATH: &str = "rest/v1";

/// Long-lived handle to the hosted store.
///
/// Built once at startup and shared; `reqwest::Client` pools connections
/// internally.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    config: StoreConfig,
}

impl fmt::Debug for RestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStore")
            .field("config", &self.config)
            .finish()
    }
}

impl RestStore {
    /// Creates the client.
    ///
    /// The endpoint and key are not checked here. A malformed endpoint
    /// fails the first query with [`StoreError::InvalidEndpoint`].
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("stockroom/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            url = %config.url,
            timeout_secs = config.timeout.as_secs(),
            "Created store client"
        );

        Ok(RestStore { http, config })
    }

    /// Builds the request URL for a query.
    fn url_for(&self, query: &Query) -> StoreResult<Url> {
        let endpoint = self.config.url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}/{}", endpoint, REST_PATH, query.table()))
            .map_err(|e| StoreError::InvalidEndpoint(format!("{:?}: {}", self.config.url, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = query.columns() {
                pairs.append_pair("select", columns);
            }
            for filter in query.filters() {
                pairs.append_pair(&filter.column, &format!("eq.{}", render_value(&filter.value)));
            }
            if let Some(order) = query.order_by() {
                let direction = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.column, direction));
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl StoreClient for RestStore {
    async fn execute(&self, query: Query) -> StoreResult<Vec<Value>> {
        let url = self.url_for(&query)?;

        debug!(
            table = %query.table(),
            operation = query.operation().name(),
            "Sending store request"
        );

        let request = match query.operation() {
            Operation::Select => self.http.get(url),
            Operation::Insert(records) => self.http.post(url).json(records),
            Operation::Update(patch) => self.http.patch(url).json(patch),
            Operation::Delete => self.http.delete(url),
        };

        let request = if matches!(query.operation(), Operation::Select) {
            request
        } else if query.returns_rows() {
            request.header("Prefer", "return=representation")
        } else {
            request.header("Prefer", "return=minimal")
        };

        let response = request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = StoreError::from_response(status.as_u16(), &body);
            debug!(table = %query.table(), error = %err, "Store reported an error");
            return Err(err);
        }

        decode_rows(&body)
    }
}

/// Renders a filter value the way the REST endpoint expects it.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turns a success body into rows.
///
/// Empty and `null` bodies are no rows; a single object is one row.
fn decode_rows(body: &[u8]) -> StoreResult<Vec<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => Ok(rows),
        row => Ok(vec![row]),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const KEY: &str = "test-anon-key";

    fn store_for(server: &MockServer) -> RestStore {
        RestStore::new(StoreConfig::new(server.base_url(), KEY)).unwrap()
    }

    #[tokio::test]
    async fn test_select_sends_query_and_auth_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/rest/v1/products")
                .query_param("select", "*")
                .query_param("order", "name.asc")
                .header("apikey", KEY)
                .header("authorization", format!("Bearer {}", KEY));
            then.status(200)
                .json_body(json!([{ "id": 1, "name": "Tea", "price": 2.0, "stock": 3 }]));
        });

        let rows = store_for(&server)
            .execute(Query::from_table("products").select("*").order("name", true))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Tea"));
    }

    #[tokio::test]
    async fn test_insert_posts_array_and_asks_for_representation() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/rest/v1/products")
                .query_param("select", "*")
                .header("prefer", "return=representation")
                .json_body(json!([{ "name": "Tea", "price": 2.0, "stock": 3 }]));
            then.status(201)
                .json_body(json!([{ "id": 9, "name": "Tea", "price": 2.0, "stock": 3 }]));
        });

        let rows = store_for(&server)
            .execute(
                Query::from_table("products")
                    .insert(vec![json!({ "name": "Tea", "price": 2.0, "stock": 3 })])
                    .select("*"),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(rows[0]["id"], json!(9));
    }

    #[tokio::test]
    async fn test_sale_projection_is_one_select_param() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/rest/v1/sales")
                .query_param("select", "*,products(name,price)")
                .query_param("order", "date.desc");
            then.status(200).json_body(json!([{
                "id": 1,
                "product_id": 2,
                "total": 4.0,
                "date": "2026-03-01T10:00:00+00:00",
                "products": { "name": "Tea", "price": 2.0 }
            }]));
        });

        let rows = store_for(&server)
            .execute(
                Query::from_table("sales")
                    .select("*,products(name,price)")
                    .order("date", false),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(rows[0]["products"]["name"], json!("Tea"));
    }

    #[tokio::test]
    async fn test_update_filters_by_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::PATCH)
                .path("/rest/v1/products")
                .query_param("id", "eq.9")
                .json_body(json!({ "stock": 0 }));
            then.status(200)
                .json_body(json!([{ "id": 9, "name": "Tea", "price": 2.0, "stock": 0 }]));
        });

        let rows = store_for(&server)
            .execute(
                Query::from_table("products")
                    .update(json!({ "stock": 0 }))
                    .eq("id", 9)
                    .select("*"),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(rows[0]["stock"], json!(0));
    }

    #[tokio::test]
    async fn test_delete_with_empty_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::DELETE)
                .path("/rest/v1/products")
                .query_param("id", "eq.abc")
                .header("prefer", "return=minimal");
            then.status(204);
        });

        let rows = store_for(&server)
            .execute(Query::from_table("products").delete().eq("id", "abc"))
            .await
            .unwrap();

        mock.assert();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_error_body_becomes_remote_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/rest/v1/products");
            then.status(409).json_body(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"products_pkey\"",
                "details": "Key (id)=(1) already exists.",
                "hint": null
            }));
        });

        let err = store_for(&server)
            .execute(
                Query::from_table("products")
                    .insert(vec![json!({ "id": 1, "name": "Tea", "price": 1.0, "stock": 1 })])
                    .select("*"),
            )
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert!(matches!(err, StoreError::Remote { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_null_body_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/rest/v1/sales");
            then.status(200).body("null");
        });

        let rows = store_for(&server)
            .execute(Query::from_table("sales").select("total"))
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_empty_endpoint_fails_on_first_call() {
        let store = RestStore::new(StoreConfig::new("", "")).unwrap();

        let err = store
            .execute(Query::from_table("products").select("*"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_decode_rows() {
        assert!(decode_rows(b"").unwrap().is_empty());
        assert!(decode_rows(b"  \n").unwrap().is_empty());
        assert_eq!(decode_rows(br#"{"id":1}"#).unwrap(), vec![json!({ "id": 1 })]);
        assert!(matches!(decode_rows(b"<html>"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let store = RestStore::new(StoreConfig::new("https://x.supabase.co", KEY)).unwrap();
        assert!(!format!("{:?}", store).contains(KEY));
    }
}
