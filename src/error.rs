use std::path::PathBuf;
use thiserror::Error;

/// Exit status used when Jotti reports rate limiting.
pub const EXIT_RATE_LIMITED: i32 = 2;

/// Exit status for any other fatal condition.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Error stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Skipping directory: {}", .path.display())]
    Directory { path: PathBuf },

    #[error("Skipping {}: not a regular file", .path.display())]
    NotRegularFile { path: PathBuf },

    #[error("Skipping {}: file size {size} exceeds {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Error calculating SHA1 checksum for {}: {source}", .path.display())]
    Checksum {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error checking Jotti's malware scan: {reason}")]
    Lookup { reason: String },

    #[error("Rate limited by Jotti. Please try again in a few minutes.")]
    RateLimited,

    #[error("Upload failed: received non-success response status: {status}")]
    UploadStatus { status: u16 },

    #[error("Upload failed: {reason}")]
    Upload { reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SubmitError {
    /// Errors that must stop the whole run instead of just the current file
    pub fn is_fatal(&self) -> bool {
        matches!(self, SubmitError::RateLimited)
    }

    /// Files filtered out before any hashing or network activity
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SubmitError::Directory { .. }
                | SubmitError::NotRegularFile { .. }
                | SubmitError::TooLarge { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SubmitError::RateLimited => EXIT_RATE_LIMITED,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_the_only_fatal_error() {
        assert!(SubmitError::RateLimited.is_fatal());
        assert_eq!(SubmitError::RateLimited.exit_code(), 2);

        let err = SubmitError::UploadStatus { status: 503 };
        assert!(!err.is_fatal());
        assert_eq!(err.exit_code(), 1);

        let err = SubmitError::Lookup {
            reason: "unexpected response status: 500".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_skip_classification() {
        let err = SubmitError::Directory {
            path: PathBuf::from("samples"),
        };
        assert!(err.is_skip());

        let err = SubmitError::TooLarge {
            path: PathBuf::from("big.iso"),
            size: 300,
            limit: 250,
        };
        assert!(err.is_skip());

        let err = SubmitError::Checksum {
            path: PathBuf::from("a.bin"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!err.is_skip());
    }

    #[test]
    fn test_error_display() {
        let err = SubmitError::TooLarge {
            path: PathBuf::from("big.iso"),
            size: 300,
            limit: 250,
        };
        assert_eq!(
            err.to_string(),
            "Skipping big.iso: file size 300 exceeds 250 byte limit"
        );

        let err = SubmitError::UploadStatus { status: 503 };
        assert_eq!(
            err.to_string(),
            "Upload failed: received non-success response status: 503"
        );
    }
}
