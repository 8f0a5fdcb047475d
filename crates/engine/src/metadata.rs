//! Process-wide memoized lookup of file metadata.

use std::collections::HashMap;

use parking_lot::Mutex;

use gl_domain::citation::FileMetadata;
use gl_upstream::UpstreamApi;

/// Unbounded cache from upstream file id to descriptive metadata.
///
/// Negative results are cached too: a file that 404s once is remembered as
/// "no metadata" and never re-queried. Lookup failures of any kind are
/// swallowed the same way — citation metadata is cosmetic, so a transport
/// hiccup must not fail the turn.
#[derive(Default)]
pub struct MetadataCache {
    entries: Mutex<HashMap<String, Option<FileMetadata>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up metadata for `file_id`, hitting upstream at most once per
    /// process lifetime for any given id.
    pub async fn get(&self, upstream: &dyn UpstreamApi, file_id: &str) -> Option<FileMetadata> {
        if let Some(cached) = self.entries.lock().get(file_id) {
            return cached.clone();
        }

        let looked_up = match upstream.file_metadata(file_id).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(file_id, error = %e, "metadata lookup failed, caching negative");
                None
            }
        };

        self.entries
            .lock()
            .entry(file_id.to_string())
            .or_insert(looked_up)
            .clone()
    }

    /// Pre-populate the cache with metadata known at upload time, so
    /// self-uploaded files never cost a round-trip.
    pub fn prime(&self, file_id: &str, meta: FileMetadata) {
        self.entries
            .lock()
            .insert(file_id.to_string(), Some(meta));
    }
}
