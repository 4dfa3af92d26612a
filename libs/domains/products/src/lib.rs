//! Products Domain
//!
//! A product catalog backed by MongoDB: filtered listing, create, view,
//! edit and delete through server-rendered pages, plus a small JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTML pages, JSON endpoints, flash notices
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, not-found policy, degradation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, filter, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers, CatalogViews, MongoProductRepository, ProductService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let repository = MongoProductRepository::new(&db);
//! let service = ProductService::new(repository);
//!
//! let router = handlers::router(service, CatalogViews::new()?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod flash;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod notice;
pub mod repository;
pub mod service;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use filter::{FilterEcho, ProductFilter};
pub use handlers::{ApiDoc, CatalogState};
pub use models::{
    DEFAULT_CATEGORY, DEFAULT_IMAGE, NewProduct, Product, ProductChanges, ProductResponse,
    ProductStats, UpdateOutcome,
};
pub use mongodb::MongoProductRepository;
pub use notice::{Notice, NoticeLevel};
pub use repository::ProductRepository;
pub use service::{CatalogPage, CategoryList, ProductService};
pub use validation::{ProductForm, ValidationError, ValidationKind};
pub use views::CatalogViews;
