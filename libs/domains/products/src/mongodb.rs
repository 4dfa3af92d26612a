//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, oid::ObjectId},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::ProductResult;
use crate::filter::ProductFilter;
use crate::models::{
    NewProduct, Product, ProductChanges, ProductStats, bson_time::to_bson_date, stored_now,
};
use crate::repository::ProductRepository;

pub const DEFAULT_COLLECTION: &str = "products";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    /// Create the indexes used by listing and filtering.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "name": 1 }, "idx_name"),
            index(doc! { "category": 1 }, "idx_category"),
            index(doc! { "price": 1 }, "idx_price"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }
}

/// Translate a [`ProductFilter`] into a MongoDB query document.
///
/// Search text is escaped so it matches literally inside `$regex`.
pub fn filter_document(filter: &ProductFilter) -> Document {
    let mut query = doc! {};

    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }

    if let Some(text) = &filter.name_contains {
        query.insert(
            "name",
            doc! { "$regex": regex::escape(text), "$options": "i" },
        );
    }

    if filter.min_price.is_some() || filter.max_price.is_some() {
        let mut price = doc! {};
        if let Some(min) = filter.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = filter.max_price {
            price.insert("$lte", max);
        }
        query.insert("price", price);
    }

    query
}

/// Build the `$set`/`$unset` update for a partial edit.
///
/// Writing `stock` also removes the legacy `quantity` key so the document
/// never carries both.
pub fn update_document(changes: &ProductChanges, updated_at: DateTime<Utc>) -> Document {
    let mut set = doc! {};

    if let Some(name) = &changes.name {
        set.insert("name", name.as_str());
    }
    if let Some(description) = &changes.description {
        set.insert("description", description.as_str());
    }
    if let Some(price) = changes.price {
        set.insert("price", price);
    }
    if let Some(stock) = changes.stock {
        set.insert("stock", stock);
    }
    if let Some(category) = &changes.category {
        set.insert("category", category.as_str());
    }
    if let Some(image) = &changes.image {
        set.insert("image", image.as_str());
    }
    set.insert("updated_at", to_bson_date(updated_at));

    let mut update = doc! { "$set": set };
    if changes.stock.is_some() {
        update.insert("$unset", doc! { "quantity": "" });
    }
    update
}

fn stats_pipeline() -> Vec<Document> {
    vec![doc! {
        "$facet": {
            "totals": [
                {
                    "$group": {
                        "_id": Bson::Null,
                        "total_products": { "$sum": 1 },
                        "total_stock": {
                            "$sum": { "$ifNull": ["$stock", { "$ifNull": ["$quantity", 0] }] }
                        },
                    }
                }
            ],
            "top_category": [
                { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
                { "$sort": { "count": -1, "_id": 1 } },
                { "$limit": 1 },
            ],
        }
    }]
}

fn as_i64(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

/// Read the single `$facet` result document into [`ProductStats`].
pub fn parse_stats(result: Option<Document>) -> ProductStats {
    let Some(result) = result else {
        return ProductStats::default();
    };

    let first = |key: &str| -> Option<Document> {
        result
            .get_array(key)
            .ok()
            .and_then(|items| items.first())
            .and_then(Bson::as_document)
            .cloned()
    };

    let totals = first("totals");
    let total_products = as_i64(totals.as_ref().and_then(|t| t.get("total_products")));
    let total_stock = as_i64(totals.as_ref().and_then(|t| t.get("total_stock")));

    let top_category = first("top_category")
        .and_then(|top| top.get_str("_id").ok().map(str::to_string));

    ProductStats {
        total_products: u64::try_from(total_products).unwrap_or_default(),
        total_stock,
        top_category,
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn list(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let products: Vec<Product> = self
            .collection
            .find(filter_document(filter))
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;

        tracing::debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(product)
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: ObjectId,
        changes: ProductChanges,
    ) -> ProductResult<Option<Product>> {
        let update = update_document(&changes, stored_now());

        let product = self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> ProductResult<Vec<String>> {
        let values = self.collection.distinct("category", doc! {}).await?;

        let mut categories: Vec<String> = values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> ProductResult<ProductStats> {
        let mut cursor = self.collection.aggregate(stats_pipeline()).await?;
        let result = cursor.try_next().await?;

        Ok(parse_stats(result))
    }
}
