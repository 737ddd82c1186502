//! File Store: named byte blobs for lesson materials.
//!
//! [`FileStore`] is the seam; [`LocalFileStore`] keeps files flat in one
//! directory. Name collisions never overwrite: the store appends `_N` before
//! the extension until the name is free.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub mod extract;
pub mod handlers;

/// Upper bound on `_N` suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileInfo {
    pub filename: String,
    pub size: u64,
    /// Unix seconds; `None` where the filesystem does not record it.
    pub created: Option<u64>,
    pub modified: Option<u64>,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Writes `bytes` under `desired_name` or the next free `_N` variant and
    /// returns the name actually used.
    async fn store(&self, bytes: &[u8], desired_name: &str) -> Result<String, StorageError>;

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    async fn list(&self) -> Result<Vec<FileInfo>, StorageError>;

    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}

/// Rejects empty names, path separators and parent references.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name == "."
        || name.contains("..");
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `attempt` 0 is the name itself; later attempts insert `_N` before the
/// extension: `notes.pdf` → `notes_1.pdf`.
pub fn candidate_name(desired: &str, attempt: u32) -> String {
    if attempt == 0 {
        return desired.to_string();
    }
    let path = Path::new(desired);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| desired.to_string());
    match path.extension() {
        Some(ext) => format!("{stem}_{attempt}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{attempt}"),
    }
}

/// Appends the uploaded file's extension when the desired name has none.
pub fn with_original_extension(desired: &str, original_filename: Option<&str>) -> String {
    if Path::new(desired).extension().is_some() {
        return desired.to_string();
    }
    match original_filename
        .and_then(|f| Path::new(f).extension())
        .map(|e| e.to_string_lossy().into_owned())
    {
        Some(ext) if !ext.is_empty() => format!("{desired}.{ext}"),
        _ => desired.to_string(),
    }
}

fn unix_secs(time: std::io::Result<std::time::SystemTime>) -> Option<u64> {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

/// Flat directory store on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Creates the root directory if it does not exist.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("File store rooted at {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

fn not_found_or_io(err: std::io::Error, name: &str) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}

/// Writes `bytes` to a freshly created file, removing it again if the write
/// fails so no truncated file is left under the claimed name.
async fn write_or_discard<W>(mut writer: W, bytes: &[u8], path: &Path) -> Result<(), StorageError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(writer);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!("Could not remove partial file {}: {cleanup}", path.display());
        }
        return Err(err.into());
    }
    Ok(())
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, bytes: &[u8], desired_name: &str) -> Result<String, StorageError> {
        validate_name(desired_name)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(desired_name, attempt);
            let path = self.root.join(&name);
            // create_new makes the existence check and the create one step.
            let file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            write_or_discard(file, bytes, &path).await?;
            debug!("Stored {} bytes as {name}", bytes.len());
            return Ok(name);
        }

        Err(StorageError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for '{desired_name}'"),
        )))
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(name)?;
        fs::read(&path).await.map_err(|e| not_found_or_io(e, name))
    }

    async fn list(&self) -> Result<Vec<FileInfo>, StorageError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            files.push(FileInfo {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                created: unix_secs(meta.created()),
                modified: unix_secs(meta.modified()),
            });
        }
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(e, name))?;
        info!("Deleted file {name}");
        Ok(())
    }
}
