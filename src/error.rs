//! Typed errors for the seams that cross module boundaries.
//!
//! Feed errors never leave the release checker; they exist so the checker can
//! log what went wrong before treating it as "no update". Install errors are
//! the one failure the host is expected to surface to the admin.

use std::path::PathBuf;

use reqwest::StatusCode;

/// Why a release feed request produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid release feed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("release feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("release feed returned HTTP {0}")]
    Status(StatusCode),

    #[error("release feed payload is not a release object: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure while finalizing an installed package.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The package is on disk but the plugin could not be re-enabled.
    #[error("plugin {plugin} was installed at {} but could not be reactivated: {reason:#}", .final_path.display())]
    Reactivation {
        plugin: String,
        final_path: PathBuf,
        reason: anyhow::Error,
    },
}
