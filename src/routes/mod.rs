//! Route modules for the Blind OCR server

pub mod admin;
pub mod health;
pub mod index;
pub mod ocr;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health_check))
        .nest("/ocr", ocr::router())
        .merge(admin::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::Response;
    use axum::Router;
    use sqlx::SqlitePool;

    use crate::auth::StaticCredentials;
    use crate::config::Config;
    use crate::db::memory_pool;
    use crate::ocr::{MockProvider, MockRasterizer, TextExtractor};
    use crate::state::AppState;

    pub const TEST_USERNAME: &str = "admin";
    pub const TEST_PASSWORD: &str = "s3cret";

    /// Router backed by an in-memory database and scripted OCR
    pub async fn test_app(
        pages: Result<usize, String>,
        responses: Vec<Result<&str, &str>>,
    ) -> (Router, SqlitePool) {
        test_app_with_config(Config::default(), pages, responses).await
    }

    pub async fn test_app_with_config(
        config: Config,
        pages: Result<usize, String>,
        responses: Vec<Result<&str, &str>>,
    ) -> (Router, SqlitePool) {
        let pool = memory_pool().await;
        let extractor = TextExtractor::new(
            Arc::new(MockRasterizer { result: pages }),
            Arc::new(MockProvider::new(responses)),
            "eng",
        );
        let state = AppState::new(
            config,
            pool.clone(),
            extractor,
            Arc::new(StaticCredentials::with_rounds(TEST_USERNAME, TEST_PASSWORD, 64)),
        );
        (super::app(state), pool)
    }

    /// Single-file multipart POST using the `file` field
    pub fn multipart_request(uri: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
        let boundary = "XTESTBOUNDARYX";
        let disposition = match filename {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                name
            ),
            None => "Content-Disposition: form-data; name=\"file\"\r\n".to_string(),
        };

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::test_support::{body_json, body_text, multipart_request, test_app, test_app_with_config};
    use crate::config::Config;
    use crate::db::LogRepository;

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app(Ok(0), vec![]).await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_index_page_links_both_endpoints() {
        let (app, _) = test_app(Ok(0), vec![]).await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("action=\"/ocr/pdf\""));
        assert!(html.contains("action=\"/ocr/image\""));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected_before_pipeline() {
        let mut config = Config::default();
        config.server.max_upload_bytes = 1024;
        let (app, pool) = test_app_with_config(config, Ok(0), vec![Ok("unused")]).await;

        let response = app
            .oneshot(multipart_request("/ocr/image", Some("huge.png"), &[0u8; 4096]))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(LogRepository::new(&pool).count().await.unwrap(), 0);
    }
}
