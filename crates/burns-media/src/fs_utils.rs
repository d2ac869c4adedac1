//! Filesystem helpers for intermediate artifacts.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Remove a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    match fs::remove_file(path.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Best-effort removal of several files.
///
/// Failures are logged, never returned. Returns the number of files removed.
pub async fn remove_files<P: AsRef<Path>>(paths: &[P]) -> usize {
    let mut removed = 0;
    for path in paths {
        let path = path.as_ref();
        match remove_if_exists(path).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Failed to remove intermediate file {}: {}", path.display(), e);
            }
        }
    }
    removed
}

/// Check that an encoder wrote a non-empty output file.
pub async fn verify_output(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    match fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(MediaError::invalid_media(format!(
            "encoder produced an empty file: {}",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(MediaError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("temp_clip_01.mp4");
        fs::write(&file, b"x").await.unwrap();

        assert!(remove_if_exists(&file).await.unwrap());
        assert!(!file.exists());
        assert!(!remove_if_exists(&file).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_files_counts_removed() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        fs::write(&a, b"x").await.unwrap();

        let removed = remove_files(&[a.clone(), b]).await;
        assert_eq!(removed, 1);
        assert!(!a.exists());
    }

    #[tokio::test]
    async fn test_verify_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("movie.mp4");

        assert!(matches!(
            verify_output(&out).await,
            Err(MediaError::FileNotFound(_))
        ));

        fs::write(&out, b"").await.unwrap();
        assert!(matches!(
            verify_output(&out).await,
            Err(MediaError::InvalidMedia(_))
        ));

        fs::write(&out, b"moov").await.unwrap();
        verify_output(&out).await.unwrap();
    }
}
