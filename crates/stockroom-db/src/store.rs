//! # Store Handle
//!
//! The single shared connection to the store, and the entry point to the
//! repositories.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Process startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::from_env() ← PUBLIC_SUPABASE_URL / _ANON_KEY              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::connect(config)  ← builds one RestStore                         │
//! │       │                                                                 │
//! │       │ cloned into every caller (Arc inside)                           │
//! │       ▼                                                                 │
//! │  store.products()   store.sales()   store.summary()                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::info;

use crate::client::StoreClient;
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::gateway::RecordGateway;
use crate::memory::MemoryStore;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::summary::SummaryRepository;
use crate::rest::RestStore;

/// Main store handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::connect(StoreConfig::from_env()?)?;
///
/// let products = store.products().get_all().await?;
/// let summary = store.summary().get_summary().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    client: Arc<dyn StoreClient>,
}

impl Store {
    /// Connects to the hosted store.
    ///
    /// No request is made here; the endpoint and key are first used by
    /// the first repository call.
    pub fn connect(config: StoreConfig) -> StoreResult<Self> {
        let client = RestStore::new(config)?;
        Ok(Store::with_client(Arc::new(client)))
    }

    /// Wraps an existing client.
    pub fn with_client(client: Arc<dyn StoreClient>) -> Self {
        Store { client }
    }

    /// Creates a store backed by in-process `products` and `sales` tables.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let store = Store::in_memory();
    /// // Isolated, nothing leaves the process
    /// ```
    pub fn in_memory() -> Self {
        info!("Using in-memory store");
        Store::with_client(Arc::new(MemoryStore::inventory()))
    }

    fn gateway(&self) -> RecordGateway {
        RecordGateway::new(self.client.clone())
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.gateway())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.gateway())
    }

    /// Returns the summary repository.
    pub fn summary(&self) -> SummaryRepository {
        SummaryRepository::new(self.gateway())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
