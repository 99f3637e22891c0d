use std::env;
use std::time::Duration;

/// Jotti's submission endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://virusscan.jotti.org/en-US/submit-file";

/// Jotti's hash search page. `{}` is replaced by the hex digest.
pub const DEFAULT_SEARCH_URL: &str = "https://virusscan.jotti.org/en-US/search/hash/{}";

/// Jotti rejects anything above 250 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 250 * 1024 * 1024;

/// Runtime configuration for a submission run
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Multipart POST target (default: Jotti submit-file)
    pub upload_url: String,

    /// Search page template, must contain `{}` (default: Jotti hash search)
    pub search_url: String,

    /// Files larger than this are skipped before hashing (default: 250 MiB)
    pub max_upload_size: u64,

    /// Per-request timeout for lookups and uploads (default: 30s)
    pub http_timeout: Duration,

    /// Pause between two files (default: 1s)
    pub file_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            http_timeout: Duration::from_secs(30),
            file_delay: Duration::from_millis(1000),
        }
    }
}

impl ScanConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or unparsable values keep
    /// their defaults.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            upload_url: var("JOTTI_UPLOAD_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.upload_url),

            search_url: var("JOTTI_SEARCH_URL")
                .filter(|v| v.contains("{}"))
                .unwrap_or(default.search_url),

            max_upload_size: var("JOTTI_MAX_UPLOAD_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            http_timeout: var("JOTTI_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.http_timeout),

            file_delay: var("JOTTI_FILE_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.file_delay),
        }
    }

    /// Config pointed at a local stand-in service, with no inter-file delay
    pub fn testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            upload_url: format!("{}/submit-file", base),
            search_url: format!("{}/search/hash/{{}}", base),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            http_timeout: Duration::from_secs(5),
            file_delay: Duration::ZERO,
        }
    }
}
