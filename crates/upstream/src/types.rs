//! Wire types for the assistants backend.
//!
//! Every field is optional or defaulted: upstream payloads are decoded
//! defensively and validated by the caller, never trusted to match the
//! documented shape exactly.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run status as reported by the upstream system.
///
/// Only `completed` is success-terminal; `failed`/`cancelled`/`expired` are
/// failure-terminal. Everything else (including statuses this build has
/// never heard of) is non-terminal and gets re-polled. `requires_action`
/// is re-polled like `in_progress` — no run we start configures tool
/// callbacks, so it can only resolve upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    #[default]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled | Self::Expired)
    }

    pub fn is_success(self) -> bool {
        self == Self::Completed
    }

    /// Lowercase wire name, used in generic "run <status>" failure messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

/// Error detail attached to a failure-terminal run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One observation of a run, as returned by create or poll.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunSnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl RunSnapshot {
    /// Human-readable failure reason: the upstream error message when
    /// present, else a generic message naming the terminal status.
    pub fn failure_reason(&self) -> String {
        self.last_error
            .as_ref()
            .and_then(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("run {}", self.status.as_str()))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Thread messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThreadMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ThreadMessage {
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

/// One content block of a thread message. Only `text` blocks carry data we
/// use; other kinds (images, etc.) decode with `text: None` and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TextBlock {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// A message annotation. Unrecognized kinds are ignored by the extractor,
/// so this decodes anything without failing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Annotation {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub file_citation: Option<FileCitationRef>,
    #[serde(default)]
    pub file_path: Option<FilePathRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileCitationRef {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilePathRef {
    #[serde(default)]
    pub file_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collection membership listing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One page of a collection's membership listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MembershipPage {
    #[serde(default)]
    pub data: Vec<MembershipEntry>,
    #[serde(default)]
    pub has_more: bool,
    /// Cursor for the next page, when `has_more` is set.
    #[serde(default)]
    pub last_id: Option<String>,
}

/// One file's attachment record within a collection. Some upstream builds
/// expose the membership id as `id` and the upload id as `file_id`; others
/// expose only `id`, which may itself be the upload id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MembershipEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
}
