//! GitHub API error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport-level failure (DNS, TLS, timeout, body decoding)
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("GitHub API error ({status}) for {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// The repository could not be determined
    #[error("Could not determine GitHub repository: {0}")]
    Repository(String),
}
