use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Body returned for unknown API paths.
#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundBody {
    pub message: String,
    pub status: String,
}

/// Whether `path` belongs to a JSON API surface (has an `/api/` segment).
pub fn is_api_path(path: &str) -> bool {
    path.starts_with("/api/") || path.contains("/api/")
}

/// JSON 404 for API paths: `{"message": "Not found <uri>", "status": "404 Not Found"}`.
pub fn api_not_found(uri: &Uri) -> Response {
    let body = NotFoundBody {
        message: format!("Not found {}", uri),
        status: StatusCode::NOT_FOUND.to_string(),
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_is_api_path() {
        assert!(is_api_path("/api/unknown"));
        assert!(is_api_path("/products/api/missing"));
        assert!(!is_api_path("/products/apiary"));
        assert!(!is_api_path("/nothing-here"));
    }

    #[tokio::test]
    async fn test_api_not_found_body() {
        let uri: Uri = "/products/api/missing".parse().unwrap();
        let response = api_not_found(&uri);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: NotFoundBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "404 Not Found");
        assert!(body.message.contains("/products/api/missing"));
    }
}
