//! Upload directory storage.
//!
//! Files are keyed by their client-supplied name. A name is only ever used
//! as a single plain path component under the upload directory.

use std::fmt::Display;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Extensions accepted for upload (compared case-insensitively).
pub const RASTER_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Invalid file type {0:?}: only .tif and .tiff files are accepted")]
    UnsupportedExtension(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload interrupted: {0}")]
    Upload(String),
}

/// Check that `name` is a single, plain path component.
pub fn validate_filename(name: &str) -> Result<&str, StorageError> {
    let invalid = || StorageError::InvalidFilename(name.to_string());

    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) if component == name => Ok(name),
        _ => Err(invalid()),
    }
}

/// Whether `name` ends in `.tif` or `.tiff`, ignoring case.
pub fn has_raster_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RASTER_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Local directory holding uploaded rasters.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Use `root` as the upload directory, creating it if absent.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Path for `name` inside the upload directory, after validation.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_filename(name)?))
    }

    /// Path of an existing upload.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stream `body` into `name`, replacing any existing file.
    ///
    /// Returns the number of bytes written. A failed upload may leave a
    /// partial file behind.
    #[instrument(skip(self, body))]
    pub async fn store<S, E>(&self, name: &str, body: S) -> Result<u64, StorageError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let path = self.path_for(name)?;
        if !has_raster_extension(name) {
            return Err(StorageError::UnsupportedExtension(name.to_string()));
        }

        let mut file = File::create(&path).await?;
        let mut written = 0u64;

        pin_mut!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| StorageError::Upload(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            debug!(bytes = written, "Upload progress");
        }
        file.flush().await?;

        info!(path = %path.display(), bytes = written, "Stored upload");
        Ok(written)
    }
}
