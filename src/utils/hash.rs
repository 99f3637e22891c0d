use crate::error::SubmitError;
use sha1::{Digest, Sha1};
use std::path::Path;

pub async fn calculate_hash_from_reader<R: tokio::io::AsyncRead + Unpin>(
    mut reader: R,
) -> std::io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = tokio::io::AsyncReadExt::read(&mut reader, &mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// SHA-1 of a file on disk, streamed in 8 KiB reads.
pub async fn calculate_file_hash(path: &Path) -> Result<String, SubmitError> {
    let checksum_error = |source| SubmitError::Checksum {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path).await.map_err(checksum_error)?;
    calculate_hash_from_reader(file).await.map_err(checksum_error)
}
