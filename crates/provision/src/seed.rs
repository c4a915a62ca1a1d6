//! Idempotent seed download.
//!
//! The seed file is written to a temporary sibling and moved onto the final
//! path only after the whole body has arrived, been synced, and (optionally)
//! matched its expected digest. A failed run never leaves a partial file at
//! the final path; the temporary file is removed when it goes out of scope.

use crate::source::SeedSource;
use crate::types::SeedOutcome;
use seedbed_core::{AppConfig, AppError, AppResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Where the seed goes and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTarget {
    pub path: PathBuf,
    pub url: String,
    pub sha256: Option<String>,
}

impl SeedTarget {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            sha256: None,
        }
    }

    /// Require the downloaded content to hash to `sha256` (hex).
    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            path: config.seed_path(),
            url: config.seed.url.clone(),
            sha256: config.seed.sha256.clone(),
        }
    }
}

/// Make sure the seed file exists at `target.path`.
///
/// If a file is already there, no request is made. Otherwise the content is
/// fetched once through `source` and atomically moved into place.
///
/// # Errors
/// - `AppError::Fetch` when the source fails or the digest does not match
/// - `AppError::Write` when the file cannot be created, written, or renamed
pub async fn ensure_seed_present(
    target: &SeedTarget,
    source: &dyn SeedSource,
) -> AppResult<SeedOutcome> {
    if let Some(bytes) = existing_size(&target.path).await? {
        tracing::info!(
            "Seed already present at {:?} ({} bytes), skipping download",
            target.path,
            bytes
        );
        return Ok(SeedOutcome::AlreadyPresent { bytes });
    }

    let dir = parent_dir(&target.path);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        AppError::Write(format!("Failed to create directory {:?}: {}", dir, e))
    })?;

    let staged = tempfile::Builder::new()
        .prefix(".seedbed-")
        .suffix(".partial")
        .tempfile_in(&dir)
        .map_err(|e| {
            AppError::Write(format!("Failed to create temporary file in {:?}: {}", dir, e))
        })?;
    tracing::debug!("Staging seed download at {:?}", staged.path());

    let handle = staged.as_file().try_clone().map_err(|e| {
        AppError::Write(format!("Failed to open temporary file: {}", e))
    })?;
    let mut file = tokio::fs::File::from_std(handle);

    let bytes = source.fetch_into(&target.url, &mut file).await?;

    file.flush()
        .await
        .map_err(|e| AppError::Write(format!("Failed to flush seed file: {}", e)))?;
    file.sync_all()
        .await
        .map_err(|e| AppError::Write(format!("Failed to sync seed file: {}", e)))?;
    drop(file);

    let digest = sha256_file(staged.path()).await?;
    if let Some(ref expected) = target.sha256 {
        if !digest.eq_ignore_ascii_case(expected) {
            return Err(AppError::Fetch(format!(
                "Digest mismatch for {}: expected {}, got {}",
                target.url, expected, digest
            )));
        }
    }

    match staged.persist_noclobber(&target.path) {
        Ok(_) => {
            tracing::info!("Seed written to {:?} ({} bytes)", target.path, bytes);
            Ok(SeedOutcome::Downloaded {
                bytes,
                sha256: digest,
            })
        }
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            // Another writer won the race; its file stands and ours is discarded.
            tracing::warn!(
                "Seed appeared at {:?} during download, keeping existing file",
                target.path
            );
            let bytes = existing_size(&target.path).await?.unwrap_or(0);
            Ok(SeedOutcome::AlreadyPresent { bytes })
        }
        Err(e) => Err(AppError::Write(format!(
            "Failed to move seed into {:?}: {}",
            target.path, e.error
        ))),
    }
}

/// Size of the file at `path`, or `None` if nothing is there.
async fn existing_size(path: &Path) -> AppResult<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Err(AppError::Write(format!(
            "Seed path {:?} exists but is not a regular file",
            path
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Write(format!(
            "Failed to inspect seed path {:?}: {}",
            path, e
        ))),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Lowercase hex SHA-256 of a file's content.
pub async fn sha256_file(path: &Path) -> AppResult<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::Write(format!("Failed to reopen {:?}: {}", path, e)))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| AppError::Write(format!("Failed to read {:?}: {}", path, e)))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
