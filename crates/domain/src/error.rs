/// Shared error type used across all Groundline crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Server-side misconfiguration (missing credential, bad bucket root).
    /// Fatal per-request; never retried.
    #[error("config: {0}")]
    Config(String),

    /// Malformed caller input, rejected before any upstream call.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Non-success response from the assistants backend. Status and body
    /// are surfaced verbatim; the caller decides whether to resubmit.
    #[error("upstream HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The run reached a failure-terminal state (failed/cancelled/expired).
    #[error("run failed: {0}")]
    RunFailed(String),

    /// The run was still non-terminal when the local wall-clock budget ran out.
    /// The run may keep executing upstream; we stop watching it.
    #[error("run timed out")]
    RunTimeout,

    /// The run completed but the thread held no assistant text to return.
    #[error("no reply found in completed run")]
    NoReplyFound,

    /// Mirror lookup miss — soft failure, citation viewing degrades only.
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
