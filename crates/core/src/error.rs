use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("search request failed: {0}")]
    Request(String),

    #[error("index not available yet: {0}")]
    NotReady(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product store not available yet: {0}")]
    NotReady(String),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no language model provider is available: {0}")]
    Unavailable(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned {status}: {details}")]
    Api {
        provider: String,
        status: u16,
        details: String,
    },

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0} returned an empty completion")]
    EmptyResponse(String),

    #[error("all candidate models failed: {0}")]
    Exhausted(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::Api { status, .. } if *status == 429 || *status == 503)
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("search index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("product store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<SearchError> for ChatError {
    fn from(value: SearchError) -> Self {
        ChatError::IndexUnavailable(value.to_string())
    }
}

impl From<StoreError> for ChatError {
    fn from(value: StoreError) -> Self {
        ChatError::StoreUnavailable(value.to_string())
    }
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
