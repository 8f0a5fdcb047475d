//! Mirror semantics on top of any [`ObjectStore`].
//!
//! Key scheme: `prefix/collectionId/files/membershipId/filename`. Deleting
//! a collection or a membership removes everything under the corresponding
//! key prefix; the delete is bulk and paginated, not transactional.

use std::collections::HashMap;
use std::sync::Arc;

use gl_domain::error::{Error, Result};

use crate::store::{ByteRange, ListPage, ObjectStore};

/// A mirrored object served back to the citation viewer.
#[derive(Debug, Clone)]
pub struct SourceObject {
    pub bytes: Vec<u8>,
    pub total_len: u64,
    /// Inclusive `(start, end)` when a byte range was served.
    pub range: Option<(u64, u64)>,
    /// Original filename, recovered from the key's last component.
    pub filename: String,
}

pub struct MirrorAdapter {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl MirrorAdapter {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn collection_prefix(&self, collection_id: &str) -> String {
        format!("{}/{}/", self.prefix, sanitize(collection_id))
    }

    fn membership_prefix(&self, collection_id: &str, membership_id: &str) -> String {
        format!(
            "{}/{}/files/{}/",
            self.prefix,
            sanitize(collection_id),
            sanitize(membership_id)
        )
    }

    /// Write path: mirror the original bytes of a freshly attached file.
    pub async fn mirror_attachment(
        &self,
        collection_id: &str,
        membership_id: &str,
        file_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let key = format!(
            "{}{}",
            self.membership_prefix(collection_id, membership_id),
            sanitize(filename)
        );
        let mut metadata = HashMap::new();
        metadata.insert("collection_id".to_string(), collection_id.to_string());
        metadata.insert("membership_id".to_string(), membership_id.to_string());
        metadata.insert("file_id".to_string(), file_id.to_string());
        metadata.insert("filename".to_string(), filename.to_string());

        let receipt = self.store.put(&key, bytes, &metadata).await?;
        tracing::info!(
            key,
            content_hash = %receipt.content_hash,
            bytes = bytes.len(),
            "attachment mirrored"
        );
        Ok(())
    }

    /// Read path: the first non-directory-marker object under the
    /// membership's prefix, optionally restricted to a byte range.
    pub async fn fetch_source(
        &self,
        collection_id: &str,
        membership_id: &str,
        range: Option<ByteRange>,
    ) -> Result<SourceObject> {
        let prefix = self.membership_prefix(collection_id, membership_id);
        let page = self.store.list(&prefix, None).await?;
        let key = page
            .keys
            .iter()
            .find(|k| !k.ends_with('/'))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("no mirrored object under {prefix}")))?;

        let read = self.store.get_range(&key, range).await?;
        let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
        Ok(SourceObject {
            bytes: read.bytes,
            total_len: read.total_len,
            range: read.range,
            filename,
        })
    }

    /// Remove every mirrored object belonging to one membership.
    pub async fn delete_membership(&self, collection_id: &str, membership_id: &str) -> Result<u64> {
        self.delete_prefix(&self.membership_prefix(collection_id, membership_id))
            .await
    }

    /// Remove every mirrored object belonging to a whole collection.
    pub async fn delete_collection(&self, collection_id: &str) -> Result<u64> {
        self.delete_prefix(&self.collection_prefix(collection_id))
            .await
    }

    /// Paginate the listing under `prefix` to exhaustion, bulk-deleting
    /// each page. Zero deletions is not an error.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64> {
        let mut deleted = 0u64;
        let mut continuation: Option<String> = None;

        loop {
            let ListPage { keys, next } =
                self.store.list(prefix, continuation.as_deref()).await?;
            if keys.is_empty() {
                break;
            }
            deleted += keys.len() as u64;
            self.store.delete(&keys).await?;
            match next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        tracing::info!(prefix, deleted, "mirror prefix pruned");
        Ok(deleted)
    }
}

/// Flatten a caller-supplied identifier into a single key component.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FsObjectStore;

    fn adapter() -> (tempfile::TempDir, MirrorAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsObjectStore::new(dir.path()));
        (dir, MirrorAdapter::new(store, "mirror"))
    }

    #[tokio::test]
    async fn mirrored_attachment_is_fetchable_by_membership() {
        let (_dir, adapter) = adapter();
        adapter
            .mirror_attachment("cs_1", "vsf_3", "file_9", "policy.pdf", b"refund policy body")
            .await
            .unwrap();

        let source = adapter.fetch_source("cs_1", "vsf_3", None).await.unwrap();
        assert_eq!(source.bytes, b"refund policy body");
        assert_eq!(source.filename, "policy.pdf");
        assert!(source.range.is_none());
    }

    #[tokio::test]
    async fn fetch_serves_byte_ranges() {
        let (_dir, adapter) = adapter();
        adapter
            .mirror_attachment("cs_1", "vsf_3", "file_9", "doc.bin", b"0123456789")
            .await
            .unwrap();

        let source = adapter
            .fetch_source("cs_1", "vsf_3", Some(ByteRange::Span(3, 6)))
            .await
            .unwrap();
        assert_eq!(source.bytes, b"3456");
        assert_eq!(source.range, Some((3, 6)));
        assert_eq!(source.total_len, 10);
    }

    #[tokio::test]
    async fn fetch_without_object_is_not_found() {
        let (_dir, adapter) = adapter();
        let err = adapter.fetch_source("cs_1", "vsf_9", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn membership_delete_leaves_siblings_alone() {
        let (_dir, adapter) = adapter();
        adapter
            .mirror_attachment("cs_1", "vsf_1", "file_1", "a.txt", b"a")
            .await
            .unwrap();
        adapter
            .mirror_attachment("cs_1", "vsf_2", "file_2", "b.txt", b"b")
            .await
            .unwrap();

        let deleted = adapter.delete_membership("cs_1", "vsf_1").await.unwrap();
        assert_eq!(deleted, 1);
        assert!(adapter.fetch_source("cs_1", "vsf_1", None).await.is_err());
        assert!(adapter.fetch_source("cs_1", "vsf_2", None).await.is_ok());
    }

    #[tokio::test]
    async fn collection_delete_removes_every_membership() {
        let (_dir, adapter) = adapter();
        for i in 1..=3 {
            adapter
                .mirror_attachment(
                    "cs_1",
                    &format!("vsf_{i}"),
                    &format!("file_{i}"),
                    "doc.txt",
                    b"body",
                )
                .await
                .unwrap();
        }
        adapter
            .mirror_attachment("cs_2", "vsf_9", "file_9", "other.txt", b"other")
            .await
            .unwrap();

        let deleted = adapter.delete_collection("cs_1").await.unwrap();
        assert_eq!(deleted, 3);
        assert!(adapter.fetch_source("cs_2", "vsf_9", None).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_an_empty_prefix_is_not_an_error() {
        let (_dir, adapter) = adapter();
        let deleted = adapter.delete_collection("cs_missing").await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn hostile_identifiers_cannot_escape_the_key_scheme() {
        let (_dir, adapter) = adapter();
        adapter
            .mirror_attachment("cs_1", "vsf_1", "file_1", "../../etc/passwd", b"x")
            .await
            .unwrap();

        // The filename flattens into one component under the membership.
        let source = adapter.fetch_source("cs_1", "vsf_1", None).await.unwrap();
        assert_eq!(source.filename, "_.._etc_passwd");
    }
}
