//! Error types for fetching, extraction and output.
//!
//! Only [`FetchFailure`] and [`MalformedDocument`] describe per-article
//! failures; both are recovered by skipping the item. Missing metadata,
//! untagged pushes and a missing signature IP are not errors at all and
//! fall back to default values inside the extractor.

/// A page could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    /// The server answered with a non-success status.
    #[error("invalid url: {url} (HTTP {status})")]
    Status { status: u16, url: String },

    /// The request never produced a response (timeout, DNS, TLS, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// An article page was fetched but has no `#main-content` container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed document: {article_id} has no main content container")]
pub struct MalformedDocument {
    pub article_id: String,
}

/// Why one listing page or article produced no result.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Malformed(#[from] MalformedDocument),

    #[error("invalid article link: {0}")]
    Link(#[from] url::ParseError),
}

/// Failures that stop a crawl or its output.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The board index could not be fetched while resolving the last page.
    #[error("could not resolve last page: {0}")]
    LastPage(#[source] FetchFailure),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("invalid page range: {0}")]
    Range(String),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;
