//! Error types for completion providers
//!
//! Every variant carries the raw upstream text where one exists so callers
//! can log or surface it unchanged.

/// Failure of a single completion call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Backend requires a key and none was configured
    #[error("api key required for provider '{provider}'")]
    MissingApiKey {
        /// Provider identifier
        provider: String,
    },

    /// Caller asked for a backend we do not know
    #[error("unknown provider: '{0}'")]
    UnknownProvider(String),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("http error: {0}")]
    Http(String),

    /// Backend answered with a non-success status
    #[error("upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Raw response body
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Backend answered successfully but produced no text
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// Call was abandoned because the caller cancelled the request
    #[error("completion cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Whether retrying the same call could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::EmptyCompletion => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Build an upstream error from status and body
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
