use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Image shown for products without one.
pub const DEFAULT_IMAGE: &str = "/static/images/default.jpg";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

/// Timestamps are written as BSON dates. Older documents may carry RFC 3339
/// strings instead, or no value at all; all three are read.
pub(crate) mod bson_time {
    use chrono::{DateTime, Utc};
    use mongodb::bson::{self, Bson};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
        bson::DateTime::from_millis(at.timestamp_millis())
    }

    pub fn from_bson_date(at: bson::DateTime) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
    }

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => to_bson_date(*at).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::DateTime(at) => Ok(Some(from_bson_date(at))),
            Bson::String(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|at| Some(at.with_timezone(&Utc)))
                .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e))),
            Bson::Null => Ok(None),
            other => Err(D::Error::custom(format!(
                "expected a date, got {:?}",
                other.element_type()
            ))),
        }
    }
}

/// Product entity as stored in the `products` collection.
///
/// Older documents keep the stock count under `quantity`; it is read
/// through the alias and written back as `stock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, alias = "quantity")]
    pub stock: i64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_image")]
    pub image: String,
    /// Absent on some older documents; see [`Product::created_at`]
    #[serde(default, with = "bson_time", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "bson_time", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a new product from validated input, stamping `created_at`.
    pub fn new(input: NewProduct) -> Self {
        Self {
            id: ObjectId::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            category: input.category,
            image: input.image,
            created_at: Some(stored_now()),
            updated_at: None,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.to_hex()
    }

    /// Creation time, falling back to the time embedded in the ObjectId
    /// for documents stored without one.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
            .unwrap_or_else(|| bson_time::from_bson_date(self.id.timestamp()))
    }

    /// Whether applying `changes` would alter any stored field.
    pub fn differs_from(&self, changes: &ProductChanges) -> bool {
        changes.name.as_ref().is_some_and(|v| *v != self.name)
            || changes
                .description
                .as_ref()
                .is_some_and(|v| *v != self.description)
            || changes.price.is_some_and(|v| v != self.price)
            || changes.stock.is_some_and(|v| v != self.stock)
            || changes.category.as_ref().is_some_and(|v| *v != self.category)
            || changes.image.as_ref().is_some_and(|v| *v != self.image)
    }

    /// Apply `changes` in memory and stamp `updated_at`.
    pub fn apply(&mut self, changes: ProductChanges, at: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(stock) = changes.stock {
            self.stock = stock;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(image) = changes.image {
            self.image = image;
        }
        self.updated_at = Some(at);
    }
}

/// Current time at the millisecond precision BSON dates keep.
pub fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub category: String,
    pub image: String,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProductChanges {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }
}

/// Outcome of an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Product),
    /// Nothing submitted differed from the stored document; no write happened.
    Unchanged(Product),
}

impl UpdateOutcome {
    pub fn product(&self) -> &Product {
        match self {
            UpdateOutcome::Updated(p) | UpdateOutcome::Unchanged(p) => p,
        }
    }
}

/// Product as exposed over JSON: id and timestamps rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    /// Hex-encoded document id
    #[schema(example = "65f1c0ffee0000000000beef")]
    pub id: String,
    #[schema(example = "Malbec")]
    pub name: String,
    pub description: String,
    #[schema(example = 12.5)]
    pub price: f64,
    #[schema(example = 10)]
    pub stock: i64,
    #[schema(example = "Red")]
    pub category: String,
    pub image: String,
    /// RFC 3339 creation time
    pub created_at: String,
    /// RFC 3339 time of the last edit, absent until the first one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id_hex(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category: product.category.clone(),
            image: product.image.clone(),
            created_at: product.created_at().to_rfc3339(),
            updated_at: product.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Catalog-wide aggregate figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductStats {
    #[schema(example = 42)]
    pub total_products: u64,
    #[schema(example = 1280)]
    pub total_stock: i64,
    /// Category with the most products; `null` for an empty catalog
    #[schema(example = "Red")]
    pub top_category: Option<String>,
}

/// Parse a path id into an `ObjectId`.
pub fn parse_id(raw: &str) -> ProductResult<ObjectId> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ProductError::InvalidId(raw.to_string()))
}
