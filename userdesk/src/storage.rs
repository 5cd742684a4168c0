//! Local-disk store for uploaded profile pictures.

use std::path::{Path, PathBuf};

use userdesk_core::{HttpError, UploadedFile};
use uuid::Uuid;

/// URL prefix under which stored files are served, and the directory part of
/// every stored relative path.
pub const PUBLIC_PREFIX: &str = "uploads";

const MAX_EXTENSION_LEN: usize = 10;

/// Errors raised while writing or removing an upload.
#[derive(Debug)]
pub enum StoreError {
    CreateDir { dir: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::CreateDir { dir, source } => {
                write!(f, "cannot create upload directory {}: {source}", dir.display())
            }
            StoreError::Write { path, source } => {
                write!(f, "cannot write upload {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::CreateDir { source, .. } | StoreError::Write { source, .. } => Some(source),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "upload could not be stored");
        HttpError::Internal("Could not store the upload".into())
    }
}

/// Writes uploads under `dir` with generated names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `file` under a fresh random name and return its relative path
    /// (`uploads/<token>.<ext>`).
    ///
    /// The client's file name only contributes its extension.
    pub async fn save(&self, file: &UploadedFile) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::CreateDir {
                dir: self.dir.clone(),
                source,
            })?;

        let name = stored_name(file.file_name.as_deref());
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &file.data)
            .await
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = file.len(), "upload stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    /// Remove a file previously returned by [`save`](Self::save).
    ///
    /// Values that are not one of our relative paths are ignored. Failures
    /// are logged, not returned.
    pub async fn discard(&self, relative: &str) {
        let Some(name) = relative
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return;
        }

        let path = self.dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "upload discarded"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to discard upload"),
        }
    }
}

/// `<uuid>` plus the original extension when it is short and alphanumeric.
fn stored_name(original: Option<&str>) -> String {
    let token = Uuid::new_v4().simple().to_string();
    match original.and_then(safe_extension) {
        Some(ext) => format!("{token}.{ext}"),
        None => token,
    }
}

fn safe_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
