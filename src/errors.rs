use std::sync::Arc;

use reqwest::StatusCode;

/// Top-level error surfaced to request-issuing code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    /// Credential rejected and not recoverable for this request (public
    /// endpoint, or the one allowed retry already spent).
    #[error("unauthorized request to '{path}'")]
    Unauthorized { path: String },
    /// Non-2xx, non-auth response passed through to the caller.
    #[error("api error {status}: {body}")]
    Api { status: StatusCode, body: String },
    /// Refresh episode failed; the session has been terminated.
    #[error("session expired: {0}")]
    SessionExpired(#[from] RefreshError),
}

/// Outcome of a failed refresh episode. `Clone` so one failure can fan out
/// to every request queued behind the episode.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("refresh response carried no usable access token")]
    MalformedResponse,
    #[error("refresh transport error: {0}")]
    Transport(Arc<reqwest::Error>),
    /// The coordinating task went away before resolving this waiter.
    #[error("refresh episode dropped before resolution")]
    Interrupted,
}
