//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::filter::ProductFilter;
use crate::models::{Product, ProductStats, UpdateOutcome, parse_id};
use crate::notice::Notice;
use crate::repository::ProductRepository;
use crate::validation::ProductForm;

/// Categories for the filter dropdown plus a notice when they could not be loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryList {
    pub categories: Vec<String>,
    pub notice: Option<Notice>,
}

/// Everything the listing page needs. Store failures become notices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub categories: Vec<String>,
    pub notices: Vec<Notice>,
}

const CATALOG_UNAVAILABLE: &str =
    "The catalog is temporarily unavailable. Showing no products.";
const CATEGORIES_UNAVAILABLE: &str = "Categories could not be loaded.";

/// Product service providing business logic operations
///
/// Validation happens here, before the repository is touched.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// List products matching a filter
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        self.repository.list(filter).await
    }

    /// Distinct categories, degrading to an empty list on store failure.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> CategoryList {
        match self.repository.categories().await {
            Ok(categories) => CategoryList {
                categories,
                notice: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories");
                CategoryList {
                    categories: Vec::new(),
                    notice: Some(Notice::error(CATEGORIES_UNAVAILABLE)),
                }
            }
        }
    }

    /// Products and categories for the listing page. Never fails.
    #[instrument(skip(self))]
    pub async fn catalog_page(&self, filter: &ProductFilter) -> CatalogPage {
        let (products, categories) = tokio::join!(self.list_products(filter), self.categories());

        let mut notices = Vec::new();
        let products = match products {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list products");
                notices.push(Notice::error(CATALOG_UNAVAILABLE));
                Vec::new()
            }
        };

        // One notice is enough when the whole store is down.
        if notices.is_empty() {
            notices.extend(categories.notice);
        }

        CatalogPage {
            products,
            categories: categories.categories,
            notices,
        }
    }

    /// Get a product by its hex id
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        let object_id = parse_id(id)?;
        self.repository
            .get_by_id(object_id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Validate and create a product. Nothing is written on validation failure.
    #[instrument(skip(self, form))]
    pub async fn create_product(&self, form: &ProductForm) -> ProductResult<Product> {
        let input = form.validate_new()?;
        self.repository.create(input).await
    }

    /// Validate and apply the submitted fields of an edit.
    ///
    /// Returns [`UpdateOutcome::Unchanged`] without writing when nothing
    /// submitted differs from the stored product.
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: &str, form: &ProductForm) -> ProductResult<UpdateOutcome> {
        let object_id = parse_id(id)?;
        let changes = form.validate_changes()?;

        let existing = self
            .repository
            .get_by_id(object_id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;

        if !existing.differs_from(&changes) {
            tracing::debug!(product_id = %id, "Edit submitted no changes");
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        self.repository
            .update(object_id, changes)
            .await?
            .map(UpdateOutcome::Updated)
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Delete a product, returning what was removed.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<Product> {
        let product = self.get_product(id).await?;

        if !self.repository.delete(product.id).await? {
            return Err(ProductError::NotFound(id.to_string()));
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> ProductResult<ProductStats> {
        self.repository.stats().await
    }
}
