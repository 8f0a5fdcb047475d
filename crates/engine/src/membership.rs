//! TTL-cached reverse index from upstream file id to collection-membership id.
//!
//! Citations arrive carrying the file's upload id, but the mirror key scheme
//! and the detach endpoint both speak membership ids. This module reconciles
//! the two namespaces by enumerating a collection's membership listing and
//! caching the resulting map for a bounded time.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use gl_domain::error::Result;
use gl_upstream::UpstreamApi;

struct CollectionIndex {
    map: HashMap<String, String>,
    built_at: Instant,
}

/// Per-collection membership indexes, keyed by collection id.
///
/// Growth is unbounded across collections (no eviction) — acceptable while
/// collection counts stay small. An index answers from cache until its age
/// reaches the TTL or a requested file id is missing from it; either
/// condition triggers a full re-enumeration. Concurrent stale misses may
/// enumerate more than once; the last writer wins and both get a fresh map.
pub struct MembershipIndexCache {
    indexes: Mutex<HashMap<String, CollectionIndex>>,
    ttl: Duration,
}

impl MembershipIndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            indexes: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Resolve each of `file_ids` to its membership id within the
    /// collection. Ids absent even after a fresh enumeration are simply
    /// missing from the result map.
    pub async fn resolve(
        &self,
        upstream: &dyn UpstreamApi,
        collection_id: &str,
        file_ids: &[String],
    ) -> Result<HashMap<String, String>> {
        {
            let indexes = self.indexes.lock();
            if let Some(index) = indexes.get(collection_id) {
                let fresh = index.built_at.elapsed() < self.ttl;
                let complete = file_ids.iter().all(|id| index.map.contains_key(id));
                if fresh && complete {
                    return Ok(Self::subset(&index.map, file_ids));
                }
            }
        }

        let map = enumerate(upstream, collection_id).await?;
        tracing::debug!(
            collection_id,
            entries = map.len(),
            "membership index rebuilt"
        );

        let subset = Self::subset(&map, file_ids);
        self.indexes.lock().insert(
            collection_id.to_string(),
            CollectionIndex {
                map,
                built_at: Instant::now(),
            },
        );
        Ok(subset)
    }

    /// Resolve one membership-id-or-file-id to a membership id, as the
    /// mirror read path requires. Ids in the upstream-file namespace go
    /// through the index; anything else is taken to already be a
    /// membership id.
    pub async fn resolve_one(
        &self,
        upstream: &dyn UpstreamApi,
        collection_id: &str,
        id: &str,
    ) -> Result<Option<String>> {
        if !looks_like_file_id(id) {
            return Ok(Some(id.to_string()));
        }
        let wanted = vec![id.to_string()];
        let resolved = self.resolve(upstream, collection_id, &wanted).await?;
        Ok(resolved.get(id).cloned())
    }

    /// Reverse lookup: the upload file id behind a membership id, as the
    /// detach flow requires before it can delete the underlying file. Ids
    /// already in the file namespace answer themselves. A fresh cached
    /// index is scanned first; a miss re-enumerates once before giving up.
    pub async fn file_id_for(
        &self,
        upstream: &dyn UpstreamApi,
        collection_id: &str,
        membership_id: &str,
    ) -> Result<Option<String>> {
        if looks_like_file_id(membership_id) {
            return Ok(Some(membership_id.to_string()));
        }

        {
            let indexes = self.indexes.lock();
            if let Some(index) = indexes.get(collection_id) {
                if index.built_at.elapsed() < self.ttl {
                    if let Some(file_id) = reverse_find(&index.map, membership_id) {
                        return Ok(Some(file_id));
                    }
                }
            }
        }

        let map = enumerate(upstream, collection_id).await?;
        let found = reverse_find(&map, membership_id);
        self.indexes.lock().insert(
            collection_id.to_string(),
            CollectionIndex {
                map,
                built_at: Instant::now(),
            },
        );
        Ok(found)
    }

    fn subset(map: &HashMap<String, String>, file_ids: &[String]) -> HashMap<String, String> {
        file_ids
            .iter()
            .filter_map(|id| map.get(id).map(|m| (id.clone(), m.clone())))
            .collect()
    }
}

/// Whether an identifier is in the upstream upload-file namespace.
pub fn looks_like_file_id(id: &str) -> bool {
    id.starts_with("file_") || id.starts_with("file-")
}

fn reverse_find(map: &HashMap<String, String>, membership_id: &str) -> Option<String> {
    map.iter()
        .find(|(_, m)| m.as_str() == membership_id)
        .map(|(f, _)| f.clone())
}

/// Walk the collection's membership listing to exhaustion, following
/// pagination cursors, and accumulate file-id → membership-id.
///
/// Entries whose membership id is itself in the file-id namespace are also
/// inserted under their own key: some upstream builds expose the upload id
/// as the listing's primary key, and the self-mapping keeps those
/// resolvable.
async fn enumerate(
    upstream: &dyn UpstreamApi,
    collection_id: &str,
) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = upstream
            .list_collection_page(collection_id, cursor.as_deref())
            .await?;

        for entry in page.data {
            let membership = match entry.id.or_else(|| entry.file_id.clone()) {
                Some(m) => m,
                None => continue,
            };
            if let Some(file_id) = entry.file_id {
                map.insert(file_id, membership.clone());
            }
            if looks_like_file_id(&membership) {
                map.insert(membership.clone(), membership);
            }
        }

        cursor = match (page.has_more, page.last_id) {
            (true, Some(last)) => Some(last),
            _ => break,
        };
    }

    Ok(map)
}
