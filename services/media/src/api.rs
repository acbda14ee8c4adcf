use crate::config::ApiConfig;
use crate::error::MediaError;
use crate::image::ImageRecord;
use crate::service::MediaService;
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument};

/// Multipart field carrying the uploaded image
pub const IMAGE_FILE_FIELD: &str = "imageFile";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub media: Arc<MediaService>,
}

/// Query parameters for the image list
#[derive(Debug, Deserialize)]
pub struct ImageListQuery {
    /// Only return images carrying this label
    pub label: Option<String>,
}

/// Create the API router
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = if config.cors_enabled {
        if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/media/images", get(list_images))
        .route("/api/v1/media/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "media-service"
    }))
}

/// List images, optionally filtered by label
#[instrument(skip(state))]
async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ImageListQuery>,
) -> Result<Json<Vec<ImageRecord>>, MediaError> {
    let images = match params.label {
        Some(label) => {
            debug!(label = %label, "Searching images by label");
            state.media.list_images_by_label(&label).await?
        }
        None => {
            debug!("Listing all images");
            state.media.list_images().await?
        }
    };

    Ok(Json(images))
}

/// Upload one image from the `imageFile` multipart field
#[instrument(skip(state, multipart))]
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Option<ImageRecord>>, MediaError> {
    while let Some(field) = multipart.next_field().await.map_err(into_io_error)? {
        if field.name() != Some(IMAGE_FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| MediaError::InvalidFileName(String::new()))?;
        let bytes = field.bytes().await.map_err(into_io_error)?;

        let record = state.media.upload_image(&file_name, bytes.to_vec()).await?;
        return Ok(Json(record));
    }

    Err(MediaError::MissingFile(IMAGE_FILE_FIELD))
}

fn into_io_error(err: axum::extract::multipart::MultipartError) -> MediaError {
    MediaError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err.body_text()))
}

/// Start the API server and run until `shutdown` resolves
pub async fn start_api_server<F>(state: AppState, config: &ApiConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!(address = %addr, "Starting media API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("API server error")?;

    Ok(())
}
