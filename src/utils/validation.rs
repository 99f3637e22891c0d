use crate::error::SubmitError;
use std::path::Path;

/// Stat a candidate file and reject anything that should never be hashed
/// or uploaded. Returns the file size.
pub async fn check_candidate(path: &Path, max_file_size: u64) -> Result<u64, SubmitError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| SubmitError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

    if metadata.is_dir() {
        return Err(SubmitError::Directory {
            path: path.to_path_buf(),
        });
    }

    if !metadata.is_file() {
        return Err(SubmitError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    let size = metadata.len();
    if size > max_file_size {
        return Err(SubmitError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_file_size,
        });
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_regular_file_within_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        assert_eq!(check_candidate(&path, 10).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_file_over_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        std::fs::write(&path, b"0123456789A").unwrap();

        let err = check_candidate(&path, 10).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::TooLarge {
                size: 11,
                limit: 10,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_candidate(dir.path(), u64::MAX).await.unwrap_err();
        assert!(matches!(err, SubmitError::Directory { .. }));
        assert!(err.is_skip());
    }

    #[tokio::test]
    async fn test_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_candidate(&dir.path().join("gone"), u64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Stat { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_device_is_not_a_regular_file() {
        let err = check_candidate(Path::new("/dev/null"), u64::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotRegularFile { .. }));
    }
}
