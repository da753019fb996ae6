use thiserror::Error;

/// Failure of a single upstream call.
///
/// Non-2xx answers are not errors here; list reads turn them into empty
/// collections and mutations into `false`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &url::Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}
