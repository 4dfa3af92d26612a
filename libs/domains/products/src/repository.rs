use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::ProductResult;
use crate::filter::ProductFilter;
use crate::models::{NewProduct, Product, ProductChanges, ProductStats};

/// Repository trait for Product persistence
///
/// Implementations evaluate [`ProductFilter`] with the semantics documented
/// on [`ProductFilter::matches`] and return lists sorted by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products matching the filter, sorted by name ascending
    async fn list(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>>;

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>>;

    /// Insert a new product, stamping `created_at`
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// Apply a partial update and stamp `updated_at` in one atomic write.
    ///
    /// Returns the updated document, or `None` if no product has this id.
    async fn update(&self, id: ObjectId, changes: ProductChanges)
    -> ProductResult<Option<Product>>;

    /// Hard delete. Returns whether a document was removed.
    async fn delete(&self, id: ObjectId) -> ProductResult<bool>;

    /// Distinct categories in use, sorted
    async fn categories(&self) -> ProductResult<Vec<String>>;

    async fn stats(&self) -> ProductResult<ProductStats>;
}
