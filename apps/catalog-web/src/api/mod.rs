//! Route assembly for the catalog web app.

pub mod health;

use axum::Router;
use domain_products::{CatalogViews, MongoProductRepository, ProductService, handlers};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::state::AppState;

/// Repository bound to the configured collection.
pub fn repository(state: &AppState) -> MongoProductRepository {
    MongoProductRepository::with_collection(&state.db, &state.config.collection)
}

/// Create the indexes used by listing. Failure is logged, not fatal.
pub async fn init_indexes(state: &AppState) {
    if let Err(e) = repository(state).init_indexes().await {
        warn!(error = %e, "Could not create product indexes, continuing without them");
    }
}

/// Catalog pages, JSON endpoints and static assets.
///
/// The catalog router carries the HTML/JSON 404 fallback, so it must be
/// passed to `create_router` as the caller-supplied routes.
pub fn routes(state: &AppState) -> eyre::Result<Router> {
    let service = ProductService::new(repository(state));
    let views = CatalogViews::new()?;

    Ok(handlers::router(service, views)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .merge(health::router(state.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::{MongoConfig, connect_lazy};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// State whose client points at a closed port, so every store call fails fast.
    async fn unreachable_state() -> AppState {
        let mongodb = MongoConfig::with_database("mongodb://127.0.0.1:1", "catalog_test")
            .with_timeouts(1, 1);
        let mongo_client = connect_lazy(&mongodb).await.unwrap();
        let db = mongo_client.database(mongodb.database());

        AppState {
            config: Config {
                app: app_info!(),
                mongodb,
                server: ServerConfig::default(),
                environment: Environment::Development,
                collection: "products".into(),
                static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
            },
            mongo_client,
            db,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let app = routes(&unreachable_state().await).unwrap();
        let (status, body) = get(app, "/static/css/catalog.css").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(".notice-success"));
    }

    #[tokio::test]
    async fn test_ready_reports_disconnected_store() {
        let app = routes(&unreachable_state().await).unwrap();
        let (status, body) = get(app, "/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("disconnected"));
        assert!(body.contains("not ready"));
    }

    #[tokio::test]
    async fn test_listing_degrades_when_store_is_down() {
        let app = routes(&unreachable_state().await).unwrap();
        let (status, body) = get(app, "/products").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("notice"));
    }

    #[tokio::test]
    async fn test_full_router_serves_openapi_and_health() {
        let state = unreachable_state().await;
        let router = axum_helpers::create_router::<crate::openapi::ApiDoc>(routes(&state).unwrap())
            .unwrap()
            .merge(axum_helpers::health_router(state.config.app));

        let (status, body) = get(router.clone(), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/products/stats"));

        let (status, body) = get(router.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("catalog_web"));

        let (status, _) = get(router, "/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
