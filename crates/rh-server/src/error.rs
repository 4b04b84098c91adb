//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`rh_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on core results.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub rh_core::Error);

impl From<rh_core::Error> for AppError {
    fn from(e: rh_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 416 carries the total size and nothing else.
        if let rh_core::Error::RangeNotSatisfiable { size } = self.0 {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{size}"))],
                Body::empty(),
            )
                .into_response();
        }

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        }

        let code = match &self.0 {
            rh_core::Error::NotFound { .. } => "not_found",
            rh_core::Error::FileUnavailable { path } => {
                tracing::warn!(
                    path = %path.display(),
                    "Catalog entry points at a missing or unreadable file"
                );
                "file_unavailable"
            }
            rh_core::Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            rh_core::Error::Validation(_) => "validation_error",
            rh_core::Error::Database { .. } => "database_error",
            rh_core::Error::Io { .. } => "io_error",
            rh_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.0.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_produces_404() {
        let response = AppError(rh_core::Error::not_found("movie", "abc")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["error"], "movie not found: abc");
    }

    #[tokio::test]
    async fn file_unavailable_produces_distinct_404() {
        let response =
            AppError(rh_core::Error::file_unavailable("/media/gone.mp4")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["code"], "file_unavailable");
        assert_eq!(body["error"], "Video file not found on server");
    }

    #[tokio::test]
    async fn range_not_satisfiable_is_empty_416() {
        let response =
            AppError(rh_core::Error::RangeNotSatisfiable { size: 1000 }).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[test]
    fn validation_produces_422() {
        let response = AppError(rh_core::Error::Validation("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_produces_500() {
        let response = AppError(rh_core::Error::Internal("oops".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
