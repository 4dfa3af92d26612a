//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Catalog",
        version = "0.1.0",
        description = "JSON endpoints of the MongoDB-backed product catalog"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    )
)]
struct CatalogInfo;

/// Service info plus the catalog's JSON endpoints.
///
/// The domain paths are already absolute, so they are merged rather than
/// nested under a prefix.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = CatalogInfo::openapi();
        doc.merge(domain_products::ApiDoc::openapi());
        doc
    }
}
