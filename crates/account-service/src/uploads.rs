//! Staged multipart uploads.
//!
//! File fields are written to the media temp directory under a random
//! name before being forwarded to the media service. A staged file is
//! removed when its handle drops, so temp files never outlive the
//! request that created them, whichever way the request ends.

use crate::crypto;
use crate::errors::AccountError;
use std::path::{Path, PathBuf};

// Hex encoding doubles this to a 24-character stem.
const STAGED_NAME_RANDOM_BYTES: usize = 12;

/// A file staged on local disk awaiting upload.
#[derive(Debug)]
pub struct TempMedia {
    path: PathBuf,
    file_name: String,
}

impl TempMedia {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Staged name under the temp directory (random stem + original extension).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for TempMedia {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged upload"
                );
            }
        }
    }
}

/// Write an uploaded file field to the temp directory.
///
/// The staged name keeps the original extension so the media service can
/// infer the content type. The temp directory is created on demand.
pub async fn stage_upload(
    temp_dir: &str,
    original_file_name: &str,
    data: &[u8],
) -> Result<TempMedia, AccountError> {
    tokio::fs::create_dir_all(temp_dir)
        .await
        .map_err(|e| AccountError::Internal(format!("Failed to create temp directory: {}", e)))?;

    let stem = crypto::generate_random_hex(STAGED_NAME_RANDOM_BYTES)?;
    let file_name = match Path::new(original_file_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) => format!("{}.{}", stem, extension),
        None => stem,
    };
    let path = Path::new(temp_dir).join(&file_name);

    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AccountError::Internal(format!("Failed to stage upload: {}", e)))?;

    Ok(TempMedia { path, file_name })
}
