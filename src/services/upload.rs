use crate::error::SubmitError;
use crate::services::progress::ProgressReader;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Form field Jotti expects the sample in.
pub const SAMPLE_FIELD: &str = "sample-file[]";

/// A fully encoded `multipart/form-data` body holding one file part.
///
/// The body is assembled in memory so its exact length is known before the
/// request starts.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new(filename: &str, contents: &[u8]) -> Self {
        Self::with_boundary(random_boundary(), filename, contents)
    }

    pub fn with_boundary(boundary: String, filename: &str, contents: &[u8]) -> Self {
        let mut bytes = part_header(&boundary, filename, contents.len() as u64);
        bytes.extend_from_slice(contents);
        bytes.extend_from_slice(part_trailer(&boundary).as_bytes());

        Self { boundary, bytes }
    }

    /// Encode the file at `path`, reading it straight into the body buffer.
    pub async fn from_file(path: &Path) -> std::io::Result<Self> {
        Self::from_file_with_boundary(random_boundary(), path).await
    }

    pub async fn from_file_with_boundary(boundary: String, path: &Path) -> std::io::Result<Self> {
        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        let mut bytes = part_header(&boundary, &sample_filename(path), size);
        let start = bytes.len();
        bytes.resize(start + size as usize, 0);
        file.read_exact(&mut bytes[start..]).await?;
        bytes.extend_from_slice(part_trailer(&boundary).as_bytes());

        Ok(Self { boundary, bytes })
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Exact number of bytes on the wire
    pub fn content_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn random_boundary() -> String {
    format!("jotti{}", Uuid::new_v4().simple())
}

/// Part header in a buffer with room for `payload` more bytes plus the trailer
fn part_header(boundary: &str, filename: &str, payload: u64) -> Vec<u8> {
    let header = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n",
        boundary = boundary,
        field = SAMPLE_FIELD,
        filename = escape_quotes(filename),
    );
    let capacity = header.len() + payload as usize + part_trailer(boundary).len();

    let mut bytes = Vec::with_capacity(capacity);
    bytes.extend_from_slice(header.as_bytes());
    bytes
}

fn part_trailer(boundary: &str) -> String {
    format!("\r\n--{}--\r\n", boundary)
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Name sent in the form part, the last path component
pub fn sample_filename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sample".to_string())
}

/// Chunked stream over an encoded body that reports progress as it is consumed
pub fn progress_stream(
    body: MultipartBody,
    sink: Box<dyn Write + Send>,
) -> ReaderStream<ProgressReader<Cursor<Vec<u8>>>> {
    let total = body.content_length();
    let reader = ProgressReader::new(Cursor::new(body.into_bytes()), total).with_sink(sink);
    ReaderStream::new(reader)
}

/// Submits a local file for scanning
#[async_trait]
pub trait SampleUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<(), SubmitError>;
}

type SinkFactory = Arc<dyn Fn() -> Box<dyn Write + Send> + Send + Sync>;

/// Multipart upload to Jotti's submit-file endpoint
pub struct JottiUploader {
    client: reqwest::Client,
    upload_url: String,
    progress_sink: SinkFactory,
}

impl JottiUploader {
    pub fn new(client: reqwest::Client, upload_url: String) -> Self {
        Self {
            client,
            upload_url,
            progress_sink: Arc::new(|| Box::new(std::io::stderr()) as Box<dyn Write + Send>),
        }
    }

    /// Where each upload draws its progress line (default: stderr)
    pub fn with_progress_sink<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Write + Send> + Send + Sync + 'static,
    {
        self.progress_sink = Arc::new(factory);
        self
    }
}

#[async_trait]
impl SampleUploader for JottiUploader {
    async fn upload(&self, path: &Path) -> Result<(), SubmitError> {
        let body = MultipartBody::from_file(path)
            .await
            .map_err(|e| SubmitError::Upload {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let content_type = body.content_type();
        let length = body.content_length();
        tracing::debug!(
            "Posting {} as a {} byte multipart body (boundary {}) to {}",
            sample_filename(path),
            length,
            body.boundary(),
            self.upload_url
        );

        let stream = progress_stream(body, (self.progress_sink)());
        let response = self
            .client
            .post(&self.upload_url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| SubmitError::Upload {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::UploadStatus {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use std::path::PathBuf;

    #[test]
    fn test_multipart_encoding() {
        let body = MultipartBody::with_boundary("XYZ".to_string(), "eicar.com", b"payload");
        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"sample-file[]\"; filename=\"eicar.com\"\r\n\
            Content-Type: application/octet-stream\r\n\r\n\
            payload\r\n\
            --XYZ--\r\n";

        assert_eq!(body.as_bytes(), expected.as_bytes());
        assert_eq!(body.content_length(), expected.len() as u64);
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_filename_quotes_are_escaped() {
        let body = MultipartBody::with_boundary("B".to_string(), "a\"b\\c.exe", b"");
        let text = String::from_utf8(body.into_bytes()).unwrap();
        assert!(text.contains("filename=\"a\\\"b\\\\c.exe\""));
    }

    #[test]
    fn test_random_boundaries() {
        let a = MultipartBody::new("x", b"1");
        let b = MultipartBody::new("x", b"1");
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.boundary().starts_with("jotti"));
        assert_eq!(a.boundary().len(), 37);
    }

    #[tokio::test]
    async fn test_from_file_matches_in_memory_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropper.exe");
        let contents: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &contents).unwrap();

        let from_disk = MultipartBody::from_file_with_boundary("B0".to_string(), &path)
            .await
            .unwrap();
        let in_memory = MultipartBody::with_boundary("B0".to_string(), "dropper.exe", &contents);

        assert_eq!(from_disk.as_bytes(), in_memory.as_bytes());
        assert_eq!(from_disk.content_length(), in_memory.content_length());
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = MultipartBody::from_file(&dir.path().join("gone.bin"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_sample_filename() {
        assert_eq!(sample_filename(Path::new("/tmp/dir/sample.exe")), "sample.exe");
        assert_eq!(sample_filename(&PathBuf::from("relative.bin")), "relative.bin");
        assert_eq!(sample_filename(Path::new("/")), "sample");
    }

    #[tokio::test]
    async fn test_progress_stream_yields_exact_body() {
        let contents: Vec<u8> = (0..20_000u32).map(|i| (i % 256) as u8).collect();
        let body = MultipartBody::new("big.bin", &contents);
        let expected = body.as_bytes().to_vec();

        let chunks: Vec<Bytes> = progress_stream(body, Box::new(std::io::sink()))
            .try_collect()
            .await
            .unwrap();
        let streamed: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();

        assert!(chunks.len() > 1);
        assert_eq!(streamed, expected);
    }
}
