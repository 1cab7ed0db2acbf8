//! WordFlow upload service: image uploads deduplicated by content hash,
//! generic attachments, and static serving of both.

pub mod config;
pub mod error;
pub mod hash_index;
pub mod routes;

pub use config::{Cli, Command, ServerConfig};
pub use error::{Result, ServerError};
pub use hash_index::{ImageHashIndex, content_hash};
pub use routes::{AppState, router};

/// Bind `addr` and serve the upload routes until the process exits.
pub async fn serve(config: ServerConfig, addr: std::net::SocketAddr) -> Result<()> {
    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("upload server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
