use async_trait::async_trait;

/// Result of a hash search against the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// A scan report already exists
    Found { url: String },
    /// No report yet; `url` can be used to check again after uploading
    NotFound { url: String },
    /// The service refused the query because of request frequency
    RateLimited,
    /// Query could not be completed
    Error { reason: String },
}

/// What a search page says about a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    Known,
    Unknown,
    RateLimited,
}

/// Literal strings recognised in the search page HTML.
///
/// Jotti answers every search with HTTP 200, so the page text is the only
/// signal. Kept separate so the strings can track site changes.
#[derive(Debug, Clone)]
pub struct ResponseMarkers {
    pub not_found: String,
    pub rate_limited: String,
}

impl Default for ResponseMarkers {
    fn default() -> Self {
        Self {
            not_found: "Hash not found".to_string(),
            rate_limited: "Too many requests".to_string(),
        }
    }
}

impl ResponseMarkers {
    pub fn classify(&self, body: &str) -> PageVerdict {
        // rate limiting wins, a throttled page says nothing about the hash
        if body.contains(&self.rate_limited) {
            PageVerdict::RateLimited
        } else if body.contains(&self.not_found) {
            PageVerdict::Unknown
        } else {
            PageVerdict::Known
        }
    }
}

/// Existence check for a content digest
#[async_trait]
pub trait HashLookup: Send + Sync {
    async fn lookup(&self, digest: &str) -> LookupResult;
}

/// Hash search against Jotti's web UI
pub struct JottiLookup {
    client: reqwest::Client,
    search_url: String,
    markers: ResponseMarkers,
}

impl JottiLookup {
    /// `search_url` must contain a `{}` placeholder for the digest
    pub fn new(client: reqwest::Client, search_url: String) -> Self {
        Self {
            client,
            search_url,
            markers: ResponseMarkers::default(),
        }
    }

    pub fn with_markers(mut self, markers: ResponseMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn search_url_for(&self, digest: &str) -> String {
        self.search_url.replacen("{}", digest, 1)
    }
}

#[async_trait]
impl HashLookup for JottiLookup {
    async fn lookup(&self, digest: &str) -> LookupResult {
        let url = self.search_url_for(digest);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                return LookupResult::Error {
                    reason: format!("request to {} failed: {}", url, e),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return LookupResult::Error {
                reason: format!("unexpected response status: {}", status.as_u16()),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return LookupResult::Error {
                    reason: format!("failed to read search page: {}", e),
                };
            }
        };

        tracing::debug!("Search page for {} is {} bytes", digest, body.len());

        match self.markers.classify(&body) {
            PageVerdict::RateLimited => LookupResult::RateLimited,
            PageVerdict::Unknown => LookupResult::NotFound { url },
            PageVerdict::Known => LookupResult::Found { url },
        }
    }
}
