//! Citation types shared between the engine and the HTTP surface.
//!
//! A reply's citations go through two stages: the extractor produces
//! [`RawCitation`]s straight from message annotations, then the resolver
//! deduplicates them and enriches each into a [`Citation`] carrying the
//! collection-membership id and descriptive file metadata.

use serde::{Deserialize, Serialize};

/// A citation as it appears in a message annotation, before resolution.
///
/// Identity for deduplication is the `(file_id, quote)` pair: the same file
/// cited with two different quotes yields two distinct citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCitation {
    /// Identifier in the upstream file namespace (e.g. `file_…`).
    pub file_id: String,
    /// Quoted excerpt, present for file-citation annotations only.
    pub quote: Option<String>,
}

/// A resolved, enriched citation attached to a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub file_id: String,
    /// Membership id of the file within the collection (`vsf_…` form).
    /// `None` when the file no longer appears in the collection listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Descriptive metadata for an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filename: String,
    pub size_bytes: u64,
}
