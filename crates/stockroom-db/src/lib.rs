//! # stockroom-db: Store Access for Stockroom
//!
//! Data-access helpers over the hosted database: products, sales and an
//! inventory summary. Every operation is one round trip. The store's error
//! comes back as [`StoreError`] with no retry.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Caller (store.products().get_all())                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Repositories  │    │    Gateway    │    │ StoreClient  │  │   │
//! │  │   │ ProductRepo   │───►│ list_all      │───►│ RestStore    │  │   │
//! │  │   │ SaleRepo      │    │ insert        │    │ MemoryStore  │  │   │
//! │  │   │ SummaryRepo   │    │ update/delete │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  └────────────────────────────────────────────────────┼──────────┘   │
//! │                                                       ▼              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Hosted Postgres  ({url}/rest/v1/{table})             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The shared store handle
//! - [`config`] - Endpoint and key from the environment
//! - [`client`] - The `StoreClient` capability and `Query`
//! - [`rest`] - Hosted REST backend
//! - [`memory`] - In-process backend
//! - [`gateway`] - Generic CRUD
//! - [`repository`] - Products, sales, summary
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Store, StoreConfig};
//!
//! let store = Store::connect(StoreConfig::from_env()?)?;
//!
//! let products = store.products().get_all().await?;
//! let summary = store.summary().get_summary().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod repository;
pub mod rest;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{Query, StoreClient};
pub use config::StoreConfig;
pub use error::{ConfigError, StoreError, StoreResult};
pub use gateway::RecordGateway;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::Store;

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::summary::SummaryRepository;
