//! HTTP handlers for the product catalog
//!
//! HTML pages for browsing and editing, plus two JSON endpoints. Page
//! handlers never surface store errors as failures: they redirect to the
//! listing with a flash notice, or render the page with an inline notice.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use axum_helpers::ErrorResponse;
use axum_helpers::errors::handlers::{api_not_found, is_api_path};
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::filter::{FilterEcho, ProductFilter};
use crate::flash::{set_flash, take_flash};
use crate::models::{ProductResponse, ProductStats, UpdateOutcome};
use crate::notice::Notice;
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::validation::ProductForm;
use crate::views::{
    CatalogViews, CategoryOption, ErrorPage, FormPage, FormValues, IndexPage, NotFoundPage,
    ProductPage, ProductView,
};

const LIST_PATH: &str = "/products";
const FALLBACK_ERROR_HTML: &str =
    "<!DOCTYPE html><html><body><h1>Something went wrong</h1></body></html>";

/// OpenAPI documentation for the catalog's JSON endpoints
#[derive(OpenApi)]
#[openapi(
    paths(product_stats, api_all_products),
    components(schemas(ProductResponse, ProductStats, ErrorResponse)),
    tags(
        (name = "Products", description = "Product catalog JSON endpoints")
    )
)]
pub struct ApiDoc;

/// Shared handler state: the service plus the compiled templates.
pub struct CatalogState<R: ProductRepository> {
    pub service: Arc<ProductService<R>>,
    pub views: CatalogViews,
}

impl<R: ProductRepository> Clone for CatalogState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            views: self.views.clone(),
        }
    }
}

/// Create the catalog router, including its not-found fallback.
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    views: CatalogViews,
) -> Router {
    let state = CatalogState {
        service: Arc::new(service),
        views,
    };

    Router::new()
        .route("/", get(root))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(list_products))
        .route("/products/new", get(new_product_form))
        .route("/products/stats", get(product_stats))
        .route("/products/api/all", get(api_all_products))
        .route("/products/{id}", get(show_product))
        .route(
            "/products/{id}/edit",
            get(edit_product_form).post(update_product),
        )
        .route("/products/{id}/update", post(update_product))
        .route(
            "/products/{id}/delete",
            get(confirm_delete).post(delete_product),
        )
        .fallback(not_found)
        .with_state(state)
}

/// Notice shown after a failed lookup or write.
pub fn notice_for(err: &ProductError) -> Notice {
    match err {
        ProductError::NotFound(_) => Notice::danger("Product not found"),
        ProductError::InvalidId(_) => Notice::danger("Invalid product id"),
        ProductError::Validation(e) => Notice::error(e.to_string()),
        ProductError::Database(_) => {
            Notice::error("The catalog is temporarily unavailable. Please try again.")
        }
        ProductError::Template(_) | ProductError::Internal(_) => {
            Notice::error("Something went wrong. Please try again.")
        }
    }
}

fn log_failure(action: &str, err: &ProductError) {
    if err.is_client_error() {
        tracing::info!(error = %err, "{} rejected", action);
    } else {
        tracing::warn!(error = %err, "{} failed", action);
    }
}

fn redirect_with(jar: CookieJar, to: &str, notice: Notice) -> Response {
    (set_flash(jar, &notice), Redirect::to(to)).into_response()
}

fn html_page(views: &CatalogViews, status: StatusCode, rendered: ProductResult<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render page");
            let page = ErrorPage {
                title: "Error",
                notices: Vec::new(),
                message: "The page could not be displayed.".to_string(),
            };
            let html = views
                .render_error(&page)
                .unwrap_or_else(|_| FALLBACK_ERROR_HTML.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

/// Where a product form posts to and how it is labelled.
struct FormTarget {
    title: String,
    action: String,
    submit_label: &'static str,
    cancel_href: String,
}

impl FormTarget {
    fn create() -> Self {
        Self {
            title: "New product".to_string(),
            action: LIST_PATH.to_string(),
            submit_label: "Create",
            cancel_href: LIST_PATH.to_string(),
        }
    }

    fn edit(id: &str, name: &str) -> Self {
        Self {
            title: format!("Edit {}", name),
            action: format!("/products/{}/edit", id),
            submit_label: "Save",
            cancel_href: format!("/products/{}", id),
        }
    }
}

async fn form_response<R: ProductRepository>(
    state: &CatalogState<R>,
    target: FormTarget,
    values: FormValues,
    mut notices: Vec<Notice>,
    status: StatusCode,
) -> Response {
    let categories = state.service.categories().await;
    notices.extend(categories.notice);

    let page = FormPage {
        title: target.title,
        notices,
        action: target.action,
        submit_label: target.submit_label,
        cancel_href: target.cancel_href,
        values,
        categories: categories.categories,
    };
    html_page(&state.views, status, state.views.render_form(&page))
}

fn form_error_status(err: &ProductError) -> StatusCode {
    match err {
        ProductError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ProductError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn root() -> Redirect {
    Redirect::to(LIST_PATH)
}

/// Listing and search page.
async fn list_products<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (jar, flash) = take_flash(jar);
    let filter = ProductFilter::from_params(&params);
    let catalog = state.service.catalog_page(&filter).await;

    let echo = FilterEcho::from(&filter);
    let mut notices: Vec<Notice> = flash.into_iter().collect();
    notices.extend(catalog.notices);

    let page = IndexPage {
        title: "Products",
        notices,
        total: catalog.products.len(),
        products: catalog.products.iter().map(ProductView::from).collect(),
        categories: CategoryOption::list(&catalog.categories, &echo.category),
        filtered: !filter.is_empty(),
        filter: echo,
    };

    (
        jar,
        html_page(&state.views, StatusCode::OK, state.views.render_index(&page)),
    )
        .into_response()
}

async fn new_product_form<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);
    let response = form_response(
        &state,
        FormTarget::create(),
        FormValues::default(),
        flash.into_iter().collect(),
        StatusCode::OK,
    )
    .await;
    (jar, response).into_response()
}

async fn create_product<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let form = ProductForm::from_params(&params);

    match state.service.create_product(&form).await {
        Ok(product) => redirect_with(
            jar,
            LIST_PATH,
            Notice::success(format!("Product '{}' created", product.name)),
        ),
        Err(e) => {
            log_failure("Create product", &e);
            form_response(
                &state,
                FormTarget::create(),
                FormValues::from(&form),
                vec![notice_for(&e)],
                form_error_status(&e),
            )
            .await
        }
    }
}

async fn show_product<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let (jar, flash) = take_flash(jar);

    match state.service.get_product(&id).await {
        Ok(product) => {
            let page = ProductPage {
                title: product.name.clone(),
                notices: flash.into_iter().collect(),
                product: ProductView::from(&product),
            };
            (
                jar,
                html_page(&state.views, StatusCode::OK, state.views.render_detail(&page)),
            )
                .into_response()
        }
        Err(e) => {
            log_failure("Show product", &e);
            redirect_with(jar, LIST_PATH, notice_for(&e))
        }
    }
}

async fn edit_product_form<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let (jar, flash) = take_flash(jar);

    match state.service.get_product(&id).await {
        Ok(product) => {
            let response = form_response(
                &state,
                FormTarget::edit(&product.id_hex(), &product.name),
                FormValues::from(&product),
                flash.into_iter().collect(),
                StatusCode::OK,
            )
            .await;
            (jar, response).into_response()
        }
        Err(e) => {
            log_failure("Edit product", &e);
            redirect_with(jar, LIST_PATH, notice_for(&e))
        }
    }
}

async fn update_product<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let form = ProductForm::from_params(&params);

    match state.service.update_product(&id, &form).await {
        Ok(UpdateOutcome::Updated(product)) => redirect_with(
            jar,
            &format!("/products/{}", product.id_hex()),
            Notice::success(format!("Product '{}' updated", product.name)),
        ),
        Ok(UpdateOutcome::Unchanged(product)) => redirect_with(
            jar,
            &format!("/products/{}", product.id_hex()),
            Notice::info("No changes were made"),
        ),
        Err(e @ (ProductError::Validation(_) | ProductError::Database(_))) => {
            log_failure("Update product", &e);
            let name = form.name.clone().unwrap_or_default();
            form_response(
                &state,
                FormTarget::edit(&id, &name),
                FormValues::from(&form),
                vec![notice_for(&e)],
                form_error_status(&e),
            )
            .await
        }
        Err(e) => {
            log_failure("Update product", &e);
            redirect_with(jar, LIST_PATH, notice_for(&e))
        }
    }
}

async fn confirm_delete<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    let (jar, flash) = take_flash(jar);

    match state.service.get_product(&id).await {
        Ok(product) => {
            let page = ProductPage {
                title: format!("Delete {}", product.name),
                notices: flash.into_iter().collect(),
                product: ProductView::from(&product),
            };
            (
                jar,
                html_page(
                    &state.views,
                    StatusCode::OK,
                    state.views.render_confirm_delete(&page),
                ),
            )
                .into_response()
        }
        Err(e) => {
            log_failure("Confirm delete", &e);
            redirect_with(jar, LIST_PATH, notice_for(&e))
        }
    }
}

async fn delete_product<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    match state.service.delete_product(&id).await {
        Ok(product) => redirect_with(
            jar,
            LIST_PATH,
            Notice::success(format!("Product '{}' deleted", product.name)),
        ),
        Err(e) => {
            log_failure("Delete product", &e);
            redirect_with(jar, LIST_PATH, notice_for(&e))
        }
    }
}

/// Catalog statistics
#[utoipa::path(
    get,
    path = "/products/stats",
    tag = "Products",
    responses(
        (status = 200, description = "Aggregate catalog figures", body = ProductStats),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn product_stats<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
) -> ProductResult<Json<ProductStats>> {
    let stats = state.service.stats().await?;
    Ok(Json(stats))
}

/// All products as JSON, sorted by name
#[utoipa::path(
    get,
    path = "/products/api/all",
    tag = "Products",
    responses(
        (status = 200, description = "Every product in the catalog", body = Vec<ProductResponse>),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
async fn api_all_products<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
) -> ProductResult<Json<Vec<ProductResponse>>> {
    let products = state
        .service
        .list_products(&ProductFilter::default())
        .await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// JSON 404 under `/api/` paths, HTML everywhere else.
async fn not_found<R: ProductRepository>(
    State(state): State<CatalogState<R>>,
    uri: Uri,
) -> Response {
    if is_api_path(uri.path()) {
        return api_not_found(&uri);
    }

    let page = NotFoundPage {
        title: "Page not found",
        notices: Vec::new(),
        path: uri.path().to_string(),
    };
    html_page(
        &state.views,
        StatusCode::NOT_FOUND,
        state.views.render_not_found(&page),
    )
}
