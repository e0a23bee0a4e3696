pub mod auth;
pub mod games;
pub mod health;
pub mod players;
pub mod public;
pub mod teams;

use tracing::warn;

use super::extract::UploadedImage;
use super::state::AppState;
use super::ApiError;

/// Persist an optional uploaded image, returning its public path.
async fn store_image(state: &AppState, image: Option<UploadedImage>) -> Result<Option<String>, ApiError> {
    let Some(image) = image else {
        return Ok(None);
    };
    let path = state
        .images
        .save(&image.file_name, image.content_type.as_deref(), &image.bytes)
        .await?;
    Ok(Some(path))
}

/// Best-effort removal of an image whose owning record wasn't written or
/// no longer exists.
async fn discard_image(state: &AppState, path: Option<&str>) {
    if let Some(path) = path {
        if let Err(e) = state.images.remove(path).await {
            warn!("Failed to remove upload {}: {}", path, e);
        }
    }
}
