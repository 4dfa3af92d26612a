//! Server-rendered HTML pages.
//!
//! Templates are Handlebars files compiled into the binary. Every page shares
//! the `header` and `footer` partials; values are HTML-escaped by Handlebars.

use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ProductError, ProductResult};
use crate::filter::FilterEcho;
use crate::models::Product;
use crate::notice::Notice;
use crate::validation::ProductForm;

const HEADER_PARTIAL: &str = include_str!("../templates/partials/header.hbs");
const FOOTER_PARTIAL: &str = include_str!("../templates/partials/footer.hbs");
const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const FORM_TEMPLATE: &str = include_str!("../templates/form.hbs");
const DETAIL_TEMPLATE: &str = include_str!("../templates/detail.hbs");
const CONFIRM_DELETE_TEMPLATE: &str = include_str!("../templates/confirm_delete.hbs");
const NOT_FOUND_TEMPLATE: &str = include_str!("../templates/not_found.hbs");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.hbs");

/// Product fields formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i64,
    pub in_stock: bool,
    pub category: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id_hex(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format!("{:.2}", product.price),
            stock: product.stock,
            in_stock: product.stock > 0,
            category: product.category.clone(),
            image: product.image.clone(),
            created_at: product.created_at().format("%Y-%m-%d %H:%M").to_string(),
            updated_at: product
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

impl CategoryOption {
    pub fn list(categories: &[String], selected: &str) -> Vec<Self> {
        categories
            .iter()
            .map(|name| Self {
                name: name.clone(),
                selected: name == selected,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub title: &'static str,
    pub notices: Vec<Notice>,
    pub products: Vec<ProductView>,
    pub total: usize,
    pub categories: Vec<CategoryOption>,
    pub filter: FilterEcho,
    pub filtered: bool,
}

/// Values shown in the create/edit form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
    pub image: String,
}

impl From<&Product> for FormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            category: product.category.clone(),
            image: product.image.clone(),
        }
    }
}

impl From<&ProductForm> for FormValues {
    fn from(form: &ProductForm) -> Self {
        let value = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            name: value(&form.name),
            description: value(&form.description),
            price: value(&form.price),
            stock: value(&form.stock),
            category: value(&form.category),
            image: value(&form.image),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub title: String,
    pub notices: Vec<Notice>,
    /// Form target, e.g. `/products` or `/products/{id}/edit`
    pub action: String,
    pub submit_label: &'static str,
    pub cancel_href: String,
    pub values: FormValues,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub title: String,
    pub notices: Vec<Notice>,
    pub product: ProductView,
}

#[derive(Debug, Serialize)]
pub struct NotFoundPage {
    pub title: &'static str,
    pub notices: Vec<Notice>,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub title: &'static str,
    pub notices: Vec<Notice>,
    pub message: String,
}

/// Registered catalog templates.
#[derive(Clone)]
pub struct CatalogViews {
    handlebars: Arc<Handlebars<'static>>,
}

impl CatalogViews {
    /// Register all partials and page templates.
    pub fn new() -> ProductResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        let register_err = |name: &str, e: handlebars::TemplateError| {
            ProductError::Template(format!("Failed to register {}: {}", name, e))
        };

        handlebars
            .register_partial("header", HEADER_PARTIAL)
            .map_err(|e| register_err("header", e))?;
        handlebars
            .register_partial("footer", FOOTER_PARTIAL)
            .map_err(|e| register_err("footer", e))?;

        for (name, source) in [
            ("index", INDEX_TEMPLATE),
            ("form", FORM_TEMPLATE),
            ("detail", DETAIL_TEMPLATE),
            ("confirm_delete", CONFIRM_DELETE_TEMPLATE),
            ("not_found", NOT_FOUND_TEMPLATE),
            ("error", ERROR_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| register_err(name, e))?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render<T: Serialize>(&self, template_name: &str, data: &T) -> ProductResult<String> {
        debug!(template = template_name, "Rendering page");
        Ok(self.handlebars.render(template_name, data)?)
    }

    pub fn render_index(&self, page: &IndexPage) -> ProductResult<String> {
        self.render("index", page)
    }

    pub fn render_form(&self, page: &FormPage) -> ProductResult<String> {
        self.render("form", page)
    }

    pub fn render_detail(&self, page: &ProductPage) -> ProductResult<String> {
        self.render("detail", page)
    }

    pub fn render_confirm_delete(&self, page: &ProductPage) -> ProductResult<String> {
        self.render("confirm_delete", page)
    }

    pub fn render_not_found(&self, page: &NotFoundPage) -> ProductResult<String> {
        self.render("not_found", page)
    }

    pub fn render_error(&self, page: &ErrorPage) -> ProductResult<String> {
        self.render("error", page)
    }
}
