//! Submit files to Jotti's malware scan (<https://virusscan.jotti.org>).
//!
//! Each file is size-checked, hashed with SHA-1 and looked up on Jotti's hash
//! search first; only unknown files are uploaded.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

pub use config::ScanConfig;
pub use error::{EXIT_FAILURE, EXIT_RATE_LIMITED, SubmitError};
pub use services::lookup::{HashLookup, JottiLookup, LookupResult, ResponseMarkers};
pub use services::progress::ProgressReader;
pub use services::submitter::{FileOutcome, RunSummary, Submitter};
pub use services::upload::{JottiUploader, MultipartBody, SampleUploader};
