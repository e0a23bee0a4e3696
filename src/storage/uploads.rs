//! Image uploads for profile pictures.
//!
//! Files are written under the configured uploads directory with a
//! collision-free name and referenced from their owning record by the
//! public path they are served at (`/uploads/<file>`).

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Reference bound on a single upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix uploaded files are served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Errors that can occur while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only image files are allowed (jpeg, jpg, png, gif), got {0}")]
    UnsupportedType(String),

    #[error("Image is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check an upload's name, declared content type and size.
///
/// Both the file extension and the content type must name an allowed
/// raster format. Returns the normalized extension.
pub fn validate_image(
    file_name: &str,
    content_type: Option<&str>,
    size: usize,
    max_bytes: usize,
) -> Result<String, UploadError> {
    if size > max_bytes {
        return Err(UploadError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedType(format!(
            "file name {:?}",
            file_name
        )));
    }

    let mime = content_type
        .map(|c| c.split(';').next().unwrap_or(c).trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType(format!(
            "content type {:?}",
            mime
        )));
    }

    Ok(extension)
}

/// On-disk store for uploaded images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the uploads directory if it doesn't exist.
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Validate and persist an image, returning its public path.
    pub async fn save(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let extension = match validate_image(file_name, content_type, bytes.len(), self.max_bytes)
        {
            Ok(ext) => ext,
            Err(e) => {
                warn!("Rejected upload {:?}: {}", file_name, e);
                return Err(e);
            }
        };

        self.ensure_dir().await?;
        let stored_name = format!(
            "{}-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            extension
        );
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        debug!("Stored upload {} ({} bytes)", stored_name, bytes.len());
        Ok(format!("{}/{}", UPLOADS_ROUTE, stored_name))
    }

    /// Remove a previously stored image by its public path.
    ///
    /// Paths that don't point directly into the store are ignored.
    pub async fn remove(&self, public_path: &str) -> Result<(), UploadError> {
        let Some(name) = public_path
            .strip_prefix(UPLOADS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return Ok(());
        };
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Ok(());
        }

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
