use axum::body::Body;
use axum::extract::{Form, Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::error::{AppError, AppResult};
use super::pages::page_url;
use super::AppState;
use crate::library::{content_type_for, is_mp3, MediaLibrary};

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let entries = state.pipeline.library().list_mp3().await?;
    Ok(Html(state.templates.index_page(&entries)))
}

/// `GET /{filename}/`
pub async fn view_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Html<String>> {
    if !MediaLibrary::is_safe_name(&filename) {
        return Err(AppError::NotFound(filename));
    }
    Ok(Html(state.templates.download_page(&filename)))
}

/// `GET /media/{filename}/`
pub async fn get_media(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let file = state
        .pipeline
        .library()
        .open(&filename)
        .await
        .ok_or_else(|| AppError::NotFound(filename.clone()))?;

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&filename)),
    );

    if is_mp3(&filename) {
        // Safe names are plain ASCII without quotes
        let disposition = format!("attachment; filename=\"{}\"", filename);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

/// `POST /download/`
pub async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> AppResult<Redirect> {
    tracing::info!("Download requested for {}", form.url);
    let outcome = state.pipeline.fetch(&form.url).await?;

    if outcome.cached {
        tracing::info!("Served {} from the media directory", outcome.filename);
    }

    Ok(Redirect::to(&page_url(&outcome.filename)))
}
