use crate::config::ScanConfig;
use crate::error::SubmitError;
use crate::services::lookup::JottiLookup;
use crate::services::submitter::Submitter;
use crate::services::upload::JottiUploader;
use std::sync::Arc;
use tracing::info;

pub fn setup_http_client(config: &ScanConfig) -> Result<reqwest::Client, SubmitError> {
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("jotti-uploader/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Wire the Jotti lookup and upload clients around one shared HTTP client
pub fn setup_submitter(config: &ScanConfig) -> Result<Submitter, SubmitError> {
    let client = setup_http_client(config)?;

    let lookup = JottiLookup::new(client.clone(), config.search_url.clone());
    let uploader = JottiUploader::new(client, config.upload_url.clone());

    info!(
        "🛡️  Jotti config: Max Size={}MB, Timeout={}s, Delay={}ms",
        config.max_upload_size / 1024 / 1024,
        config.http_timeout.as_secs(),
        config.file_delay.as_millis()
    );

    Ok(Submitter::new(
        Arc::new(lookup),
        Arc::new(uploader),
        config.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_submitter_with_defaults() {
        let config = ScanConfig::default();
        assert!(setup_http_client(&config).is_ok());
        assert!(setup_submitter(&config).is_ok());
    }
}
