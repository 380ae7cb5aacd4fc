//! Image uploads.
//!
//! Files are written to a single directory under their client-supplied name
//! and served back from the `/img` prefix. A later upload with the same name
//! replaces the earlier file, so every post referencing that name shows the
//! newest image.

use std::path::PathBuf;

use thiserror::Error;

/// Public URL prefix of the upload directory.
pub const PUBLIC_PREFIX: &str = "/img";

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The client filename has no usable final component.
    #[error("invalid upload filename: {0:?}")]
    InvalidFilename(String),

    /// Writing the file failed.
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Writes uploaded images into a public directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `file` to disk and return its public path.
    ///
    /// Only the last path component of the client filename is used, so a
    /// name like `../../etc/passwd` lands in the upload directory as `passwd`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidFilename` if no filename remains after
    /// stripping directories, or `UploadError::Io` if the write fails.
    pub async fn save(&self, file: &UploadedFile) -> Result<String, UploadError> {
        let name = stored_name(&file.filename)
            .ok_or_else(|| UploadError::InvalidFilename(file.filename.clone()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), &file.bytes).await?;

        tracing::info!(filename = %name, bytes = file.bytes.len(), "Stored upload");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }
}

/// Final path component of a client filename, if any.
fn stored_name(filename: &str) -> Option<&str> {
    // Browsers on Windows may send backslash-separated paths.
    let last = filename.rsplit(['/', '\\']).next()?;
    match last {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
