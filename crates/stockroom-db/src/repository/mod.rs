//! # Repository Module
//!
//! Store repositories for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │  store.products().update(&id, &ProductUpdate::stock(4))         │
//! │       ▼                                                                 │
//! │  ProductRepository / SaleRepository / SummaryRepository                 │
//! │       │  table names, column lists, ordering                            │
//! │       ▼                                                                 │
//! │  RecordGateway          one Query per call, error checked at once       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreClient            RestStore (hosted) or MemoryStore (in-process)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`SaleRepository`](sale::SaleRepository) - Sale listing and creation
//! - [`SummaryRepository`](summary::SummaryRepository) - Derived totals

pub mod product;
pub mod sale;
pub mod summary;
