use super::shutdown::{ShutdownCoordinator, coordinated_shutdown, shutdown_signal};
use crate::http::security_headers;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

const CORS_ENV: &str = "CORS_ALLOWED_ORIGIN";

/// Starts the Axum server with graceful shutdown.
///
/// # Errors
/// Returns an error if the listener fails to bind or the server fails while running.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    Ok(())
}

/// Builds a CORS layer from the comma-separated `CORS_ALLOWED_ORIGIN` variable.
///
/// Returns `Ok(None)` when the variable is unset or blank; the catalog pages are
/// same-origin, so CORS only matters when the JSON endpoints are shared.
pub fn cors_from_env() -> io::Result<Option<CorsLayer>> {
    let Ok(origins_str) = std::env::var(CORS_ENV) else {
        return Ok(None);
    };

    let allowed_origins: Vec<HeaderValue> = origins_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {} value: {}", CORS_ENV, e),
            )
        })?;

    if allowed_origins.is_empty() {
        return Ok(None);
    }

    info!("CORS configured with allowed origins: {}", origins_str);

    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    Ok(Some(layer))
}

/// Wraps the application routes with documentation and cross-cutting middleware.
///
/// This sets up:
/// - Swagger UI at `/swagger-ui` serving `/api-docs/openapi.json`
/// - The given routes, merged at the root
/// - Request tracing, security headers and response compression
/// - A CORS layer when `CORS_ALLOWED_ORIGIN` is set
///
/// The fallback is left to the caller: set it on `routes` before passing them
/// in so that the layers above also wrap it.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` holds an invalid origin.
pub fn create_router<T>(routes: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_swagger_ui::SwaggerUi;

    let cors = cors_from_env()?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(CompressionLayer::new());

    Ok(match cors {
        Some(layer) => router.layer(layer),
        None => router,
    })
}

/// Production server with coordinated shutdown and a bounded cleanup step.
///
/// `cleanup` runs once the shutdown signal arrives and is abandoned after
/// `shutdown_timeout`.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let mut shutdown_rx = coordinator.subscribe();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        if shutdown_rx.recv().await.is_err() {
            return;
        }

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(
                "Cleanup exceeded timeout of {:?}, forcing shutdown",
                shutdown_timeout
            ),
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(coordinator))
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    cleanup_handle.await.ok();

    serve_result
}
