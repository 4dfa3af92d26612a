//! Shared fixtures for the products integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use chrono::Utc;
use domain_products::*;
use http_body_util::BodyExt;
use ::mongodb::bson::oid::ObjectId;

/// In-memory repository that evaluates filters with `ProductFilter::matches`.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_by_id(&self, id: ObjectId) -> ProductResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: ProductChanges,
    ) -> ProductResult<Option<Product>> {
        let mut products = self.products.lock().unwrap();
        Ok(products.iter_mut().find(|p| p.id == id).map(|p| {
            p.apply(changes, Utc::now());
            p.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn categories(&self) -> ProductResult<Vec<String>> {
        let mut categories: Vec<String> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn stats(&self) -> ProductResult<ProductStats> {
        let products = self.products.lock().unwrap();
        let mut counts: Vec<(String, u64)> = Vec::new();
        for product in products.iter() {
            match counts.iter_mut().find(|(c, _)| *c == product.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((product.category.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(ProductStats {
            total_products: products.len() as u64,
            total_stock: products.iter().map(|p| p.stock).sum(),
            top_category: counts.first().map(|(c, _)| c.clone()),
        })
    }
}

/// Repository whose every call fails like an unreachable MongoDB.
pub struct UnreachableRepository;

fn unreachable_error() -> ProductError {
    ProductError::Database("Server selection timeout: No available servers".into())
}

#[async_trait]
impl ProductRepository for UnreachableRepository {
    async fn list(&self, _filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        Err(unreachable_error())
    }

    async fn get_by_id(&self, _id: ObjectId) -> ProductResult<Option<Product>> {
        Err(unreachable_error())
    }

    async fn create(&self, _input: NewProduct) -> ProductResult<Product> {
        Err(unreachable_error())
    }

    async fn update(
        &self,
        _id: ObjectId,
        _changes: ProductChanges,
    ) -> ProductResult<Option<Product>> {
        Err(unreachable_error())
    }

    async fn delete(&self, _id: ObjectId) -> ProductResult<bool> {
        Err(unreachable_error())
    }

    async fn categories(&self) -> ProductResult<Vec<String>> {
        Err(unreachable_error())
    }

    async fn stats(&self) -> ProductResult<ProductStats> {
        Err(unreachable_error())
    }
}

pub fn product(name: &str, price: f64, stock: i64, category: &str) -> Product {
    Product::new(NewProduct {
        name: name.into(),
        description: String::new(),
        price,
        stock,
        category: category.into(),
        image: DEFAULT_IMAGE.into(),
    })
}

pub fn app_with<R: ProductRepository + 'static>(repository: R) -> Router {
    let service = ProductService::new(repository);
    handlers::router(service, CatalogViews::new().unwrap())
}

pub async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn text_body(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
