use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Error type for HTTP handlers.
///
/// Pipeline failures become a plain-text 400 carrying the error chain; missing
/// media becomes an empty 404.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("media not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Pipeline(#[from] anyhow::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(name) => {
                tracing::debug!("Media not found: {}", name);
                StatusCode::NOT_FOUND.into_response()
            }
            AppError::Pipeline(err) => {
                let message = format!("{:#}", err);
                tracing::error!(error = %message, "Request failed");
                (
                    StatusCode::BAD_REQUEST,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    message,
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn pipeline_error_is_plain_text_400() {
        let err = anyhow::anyhow!("yt-dlp exploded").context("Failed to resolve https://x.test");
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"Failed to resolve https://x.test: yt-dlp exploded");
    }

    #[tokio::test]
    async fn not_found_is_empty_404() {
        let response = AppError::NotFound("x.mp3".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
