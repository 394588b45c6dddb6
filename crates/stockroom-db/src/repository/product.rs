//! # Product Repository
//!
//! Store operations for the `products` table.
//!
//! ## Key Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_all()            GET    products?select=*&order=name.asc           │
//! │  create(new)          POST   products?select=*      → created row       │
//! │  update(id, patch)    PATCH  products?id=eq.{id}    → updated row       │
//! │  delete(id)           DELETE products?id=eq.{id}                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{NewProduct, Product, ProductUpdate, RecordId};

use crate::error::StoreResult;
use crate::gateway::RecordGateway;

/// Table holding products.
pub const PRODUCTS_TABLE: &str = "products";

/// Repository for product store operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
///
/// let created = repo.create(&NewProduct::new("Coffee", 3.5, 12)).await?;
/// let restocked = repo.update(&created.id, &ProductUpdate::stock(20)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    gateway: RecordGateway,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(gateway: RecordGateway) -> Self {
        ProductRepository { gateway }
    }

    /// Lists every product, sorted by name.
    pub async fn get_all(&self) -> StoreResult<Vec<Product>> {
        self.gateway.list_all(PRODUCTS_TABLE, "*", "name", true).await
    }

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row as stored, with its generated id
    /// * `Err(StoreError)` - Rejected by the store (duplicate id, ...)
    pub async fn create(&self, product: &NewProduct) -> StoreResult<Product> {
        self.gateway.insert(PRODUCTS_TABLE, product, "*").await
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated row
    /// * `Err(StoreError::NoRows)` - No product has this id
    pub async fn update(&self, id: &RecordId, changes: &ProductUpdate) -> StoreResult<Product> {
        self.gateway
            .update_by_id(PRODUCTS_TABLE, id, changes, "*")
            .await
    }

    /// Deletes a product. Deleting a missing id is not an error.
    pub async fn delete(&self, id: &RecordId) -> StoreResult<()> {
        self.gateway.delete_by_id(PRODUCTS_TABLE, id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    fn repo() -> ProductRepository {
        ProductRepository::new(RecordGateway::new(Arc::new(MemoryStore::inventory())))
    }

    #[tokio::test]
    async fn test_create_then_get_all_contains_product_once() {
        let repo = repo();
        repo.create(&NewProduct::new("Tea", 2.0, 4)).await.unwrap();

        let created = repo.create(&NewProduct::new("Coffee", 3.5, 10)).await.unwrap();
        let all = repo.get_all().await.unwrap();

        assert_eq!(all.iter().filter(|p| **p == created).count(), 1);
        assert_eq!(created.name, "Coffee");
        assert_eq!(created.price, 3.5);
        assert_eq!(created.stock, 10);
    }

    #[tokio::test]
    async fn test_get_all_sorted_by_name() {
        let repo = repo();
        for name in ["Milk", "Bread", "Eggs"] {
            repo.create(&NewProduct::new(name, 1.0, 1)).await.unwrap();
        }

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Bread", "Eggs", "Milk"]);
    }

    #[tokio::test]
    async fn test_update_stock_leaves_other_fields() {
        let repo = repo();
        let other = repo.create(&NewProduct::new("Tea", 2.0, 4)).await.unwrap();
        let product = repo.create(&NewProduct::new("Coffee", 3.5, 10)).await.unwrap();

        let updated = repo
            .update(&product.id, &ProductUpdate::stock(0))
            .await
            .unwrap();
        assert_eq!(updated.stock, 0);

        let all = repo.get_all().await.unwrap();
        let stored = all.iter().find(|p| p.id == product.id).unwrap();
        assert_eq!(stored.stock, 0);
        assert_eq!(stored.name, product.name);
        assert_eq!(stored.price, product.price);
        assert!(all.contains(&other));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let err = repo()
            .update(&RecordId::Int(404), &ProductUpdate::price(1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::NoRows { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_product() {
        let repo = repo();
        let keep = repo.create(&NewProduct::new("Tea", 2.0, 4)).await.unwrap();
        let gone = repo.create(&NewProduct::new("Coffee", 3.5, 10)).await.unwrap();

        repo.delete(&gone.id).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert!(all.iter().all(|p| p.id != gone.id));
        assert_eq!(all, vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_ok() {
        repo().delete(&RecordId::Int(7)).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = repo();
        repo.create(&NewProduct::new("Tea", 2.0, 4).with_id(1))
            .await
            .unwrap();

        let err = repo
            .create(&NewProduct::new("Coffee", 3.5, 10).with_id(1))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }
}
