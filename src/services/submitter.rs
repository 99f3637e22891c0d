use crate::config::ScanConfig;
use crate::error::SubmitError;
use crate::services::lookup::{HashLookup, LookupResult};
use crate::services::upload::SampleUploader;
use crate::utils::hash::calculate_file_hash;
use crate::utils::validation::check_candidate;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::sleep;

/// How a single file left the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Jotti already had a report for this content
    AlreadyScanned { digest: String, url: String },
    /// Sample was accepted; `url` is where its report will appear
    Uploaded { digest: String, url: String },
}

/// Tally of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub already_scanned: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.uploaded + self.already_scanned + self.skipped + self.failed
    }
}

/// Walks the file list: size check, checksum, lookup, upload.
pub struct Submitter {
    lookup: Arc<dyn HashLookup>,
    uploader: Arc<dyn SampleUploader>,
    config: ScanConfig,
}

impl Submitter {
    pub fn new(
        lookup: Arc<dyn HashLookup>,
        uploader: Arc<dyn SampleUploader>,
        config: ScanConfig,
    ) -> Self {
        Self {
            lookup,
            uploader,
            config,
        }
    }

    /// Process `paths` in order, writing per-file results to `out`.
    ///
    /// Per-file failures are logged and counted. Rate limiting aborts the
    /// run and is returned as `Err(SubmitError::RateLimited)`.
    pub async fn run<W: Write>(
        &self,
        paths: &[PathBuf],
        out: &mut W,
    ) -> Result<RunSummary, SubmitError> {
        let mut summary = RunSummary::default();

        for (index, path) in paths.iter().enumerate() {
            if index > 0 && !self.config.file_delay.is_zero() {
                sleep(self.config.file_delay).await;
            }

            match self.process_file(path, out).await {
                Ok(FileOutcome::AlreadyScanned { .. }) => summary.already_scanned += 1,
                Ok(FileOutcome::Uploaded { .. }) => summary.uploaded += 1,
                Err(e) if e.is_fatal() => {
                    tracing::error!("{}", e);
                    return Err(e);
                }
                Err(e) if e.is_skip() => {
                    tracing::warn!("{}", e);
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(file = %path.display(), "{}", e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    pub async fn process_file<W: Write>(
        &self,
        path: &Path,
        out: &mut W,
    ) -> Result<FileOutcome, SubmitError> {
        let size = check_candidate(path, self.config.max_upload_size).await?;
        tracing::debug!("{} is {} bytes", path.display(), size);

        let digest = calculate_file_hash(path).await?;
        writeln!(out, "SHA1 Checksum: {}", digest)?;

        match self.lookup.lookup(&digest).await {
            LookupResult::RateLimited => Err(SubmitError::RateLimited),
            LookupResult::Error { reason } => Err(SubmitError::Lookup { reason }),
            LookupResult::Found { url } => {
                writeln!(out, "File {} found on Jotti:\n{}", path.display(), url)?;
                Ok(FileOutcome::AlreadyScanned { digest, url })
            }
            LookupResult::NotFound { url } => {
                write!(out, "Uploading {}: ", path.display())?;
                out.flush()?;

                if let Err(e) = self.uploader.upload(path).await {
                    writeln!(out, "FAILED")?;
                    return Err(e);
                }

                writeln!(out, "OK")?;
                writeln!(out, "{}", url)?;
                Ok(FileOutcome::Uploaded { digest, url })
            }
        }
    }
}
