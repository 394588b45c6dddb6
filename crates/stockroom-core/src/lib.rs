//! # stockroom-core: Domain Types for Stockroom
//!
//! Record types for the `products` and `sales` tables and the pure summary
//! fold. This crate performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Products page ──► Sales page ──► Dashboard                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────────┐            ┌───────────────────┐       │   │
//! │  │   │      types        │            │     summary       │       │   │
//! │  │   │  Product, Sale    │            │  Summary fold     │       │   │
//! │  │   │  NewSale, ...     │            │                   │       │   │
//! │  │   └───────────────────┘            └───────────────────┘       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Store Access)                     │   │
//! │  │           REST client, gateway, repositories                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record types (Product, Sale, write payloads)
//! - [`summary`] - Derived inventory/sales metrics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod summary;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use summary::{ProductStock, SaleTotal, Summary};
pub use types::*;
