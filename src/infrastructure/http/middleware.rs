//! HTTP Middleware
//!
//! HTTP 状态码错误日志中间件

use axum::{extract::Request, middleware::Next, response::Response};
use http::header::LOCATION;

/// HTTP 状态码日志中间件
///
/// 4xx / 5xx 记录告警或错误，重定向记录目标地址（debug）
/// 错误详情在 ApiError::into_response() 中记录，这里只记录方法、路径和状态码
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "HTTP client error"
        );
    } else if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        tracing::debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            location = %location,
            "HTTP redirect"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::ApiError;
    use axum::{body::Body, response::Html, routing::get, Router};
    use http::{Request as HttpRequest, StatusCode};
    use tower::util::ServiceExt;

    async fn page() -> Html<&'static str> {
        Html("<h1>ok</h1>")
    }

    async fn missing() -> Result<Html<&'static str>, ApiError> {
        Err(ApiError::NotFound("Entity not found: 7".to_string()))
    }

    async fn broken() -> Result<Html<&'static str>, ApiError> {
        Err(ApiError::Internal("template exploded".to_string()))
    }

    fn create_test_router() -> Router {
        Router::new()
            .route("/admin", get(page))
            .route("/admin/blog/post/7/change", get(missing))
            .route("/admin/blog/post", get(broken))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        create_test_router()
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_passes_through_success() {
        assert_eq!(status_of("/admin").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_passes_through_client_error() {
        assert_eq!(
            status_of("/admin/blog/post/7/change").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of("/unrouted").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_passes_through_server_error() {
        assert_eq!(
            status_of("/admin/blog/post").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
