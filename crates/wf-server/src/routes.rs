//! HTTP routes of the upload service.
//!
//! - `POST /upload`: image upload with content-hash deduplication
//! - `POST /upload-file`: generic attachment upload
//! - `GET /download/{filename}`: attachment download
//! - `/images/*`, `/files/*`: static serving of stored uploads

use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::hash_index::{ImageHashIndex, content_hash};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    /// Held across the whole check-then-store of an image upload.
    hashes: Arc<Mutex<ImageHashIndex>>,
}

impl AppState {
    /// Create the upload directories and load the hash index.
    pub fn new(config: ServerConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.images_dir)?;
        std::fs::create_dir_all(&config.files_dir)?;
        let hashes = ImageHashIndex::load(&config.hash_map_path)?;
        Ok(Self {
            config: Arc::new(config),
            hashes: Arc::new(Mutex::new(hashes)),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(&state.config.images_dir);
    let files = ServeDir::new(&state.config.files_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/upload", post(upload_image))
        .route("/upload-file", post(upload_file))
        .route("/download/{filename}", get(download))
        .nest_service("/images", images)
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Responses ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploaded {
    pub image_url: String,
    pub is_duplicate: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploaded {
    pub file_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
}

// ─── Multipart ──────────────────────────────────────────────────────────

struct FilePart {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

struct UploadForm {
    file: Option<FilePart>,
    original_name: Option<String>,
}

/// Drain the multipart body, keeping the part named `file_field` and the
/// optional `originalName` text field.
async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm> {
    let mut form = UploadForm {
        file: None,
        original_name: None,
    };
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(name) if name == file_field => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                form.file = Some(FilePart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("originalName") => {
                let text = field.text().await?;
                form.original_name = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Storage name for an upload: `<field>-<millis>-<random><.ext>`, keeping
/// the extension of the client's file name when it is plain alphanumeric.
pub fn stored_file_name(field: &str, original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("{field}-{millis}-{suffix}{ext}")
}

// ─── Handlers ───────────────────────────────────────────────────────────

async fn upload_image(State(state): State<AppState>, multipart: Multipart) -> Result<Json<ImageUploaded>> {
    let file = read_form(multipart, "image").await?.file.ok_or(ServerError::MissingFile)?;
    let hash = content_hash(&file.bytes);
    log::debug!("image upload: {} bytes, md5 {hash}", file.bytes.len());

    let mut hashes = state.hashes.lock().await;
    if let Some(existing) = hashes.get(&hash).map(str::to_string) {
        if tokio::fs::try_exists(state.config.images_dir.join(&existing)).await? {
            log::info!("duplicate image, reusing {existing}");
            return Ok(Json(ImageUploaded {
                image_url: format!("/images/{existing}"),
                is_duplicate: true,
            }));
        }
        log::warn!("hash entry for {existing} points at a missing file; replacing it");
    }

    let file_name = stored_file_name("image", file.file_name.as_deref());
    tokio::fs::write(state.config.images_dir.join(&file_name), &file.bytes).await?;
    hashes.insert(hash, file_name.clone());
    if let Err(err) = hashes.persist().await {
        log::error!("failed to save image hash map: {err}");
    }

    log::info!("stored new image {file_name}");
    Ok(Json(ImageUploaded {
        image_url: format!("/images/{file_name}"),
        is_duplicate: false,
    }))
}

async fn upload_file(State(state): State<AppState>, multipart: Multipart) -> Result<Json<FileUploaded>> {
    let form = read_form(multipart, "file").await?;
    let file = form.file.ok_or(ServerError::MissingFile)?;
    let display_name = form.original_name.or(file.file_name);

    let file_name = stored_file_name("file", display_name.as_deref());
    tokio::fs::write(state.config.files_dir.join(&file_name), &file.bytes).await?;
    log::info!("stored attachment {file_name} ({} bytes)", file.bytes.len());

    Ok(Json(FileUploaded {
        file_url: format!("/files/{file_name}"),
        file_name: display_name.unwrap_or_else(|| file_name.clone()),
        file_size: file.bytes.len() as u64,
        file_type: file
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }))
}

async fn download(State(state): State<AppState>, UrlPath(filename): UrlPath<String>) -> Result<impl IntoResponse> {
    if filename.is_empty() || filename.contains("..") || filename.contains(['/', '\\']) {
        return Err(ServerError::InvalidFileName(filename));
    }
    let bytes = match tokio::fs::read(state.config.files_dir.join(&filename)).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(filename));
        }
        Err(err) => return Err(err.into()),
    };
    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
