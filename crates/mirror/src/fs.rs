//! Filesystem-backed object store.
//!
//! Keys map to paths under a root directory; auxiliary metadata lives in a
//! `.meta/` shadow tree as JSON side files so it never shows up in key
//! listings. Listing is lexicographic with synthetic continuation tokens,
//! which keeps the paginated-delete path honest even on this backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use gl_domain::error::{Error, Result};

use crate::store::{ByteRange, ListPage, ObjectRead, ObjectStore, PutReceipt, LIST_PAGE_SIZE};

const META_DIR: &str = ".meta";

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(validated(key)?))
    }

    fn meta_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(META_DIR)
            .join(format!("{}.json", validated(key)?)))
    }

    /// All keys under the root, lexicographically sorted.
    fn walk_keys(root: &Path) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(e) => e,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let entry = entry?;
                let path = entry.path();
                if path.file_name().and_then(|n| n.to_str()) == Some(META_DIR)
                    && dir == root
                {
                    continue;
                }
                if entry.file_type()?.is_dir() {
                    pending.push(path);
                } else if let Ok(rel) = path.strip_prefix(root) {
                    let key = rel
                        .components()
                        .filter_map(|c| c.as_os_str().to_str())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Reject keys that could escape the root or collide with the meta tree.
fn validated(key: &str) -> Result<&str> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.ends_with('/')
        || key.split('/').any(|c| c.is_empty() || c == "." || c == "..")
        || key.split('/').next() == Some(META_DIR);
    if bad {
        return Err(Error::BadRequest(format!("invalid object key: {key:?}")));
    }
    Ok(key)
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        metadata: &HashMap<String, String>,
    ) -> Result<PutReceipt> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        if !metadata.is_empty() {
            let meta_path = self.meta_path(key)?;
            if let Some(parent) = meta_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&meta_path, serde_json::to_vec_pretty(metadata)?).await?;
        }

        let content_hash = hex::encode(Sha256::digest(bytes));
        tracing::debug!(key, bytes = bytes.len(), "object stored");
        Ok(PutReceipt { content_hash })
    }

    async fn get_range(&self, key: &str, range: Option<ByteRange>) -> Result<ObjectRead> {
        let path = self.object_path(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("no object at key {key}")));
            }
            Err(e) => return Err(e.into()),
        };
        let total_len = bytes.len() as u64;

        match range {
            None => Ok(ObjectRead {
                bytes,
                total_len,
                range: None,
            }),
            Some(spec) => {
                let (start, end) = spec.resolve(total_len)?;
                Ok(ObjectRead {
                    bytes: bytes[start as usize..=end as usize].to_vec(),
                    total_len,
                    range: Some((start, end)),
                })
            }
        }
    }

    async fn list(&self, prefix: &str, continuation: Option<&str>) -> Result<ListPage> {
        let root = self.root.clone();
        let all = tokio::task::spawn_blocking(move || Self::walk_keys(&root))
            .await
            .map_err(|e| Error::Http(format!("listing task failed: {e}")))??;

        let mut matching = all
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .skip_while(|k| match continuation {
                Some(token) => k.as_str() <= token,
                None => false,
            });

        let keys: Vec<String> = matching.by_ref().take(LIST_PAGE_SIZE).collect();
        let next = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };
        Ok(ListPage { keys, next })
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            for path in [self.object_path(key)?, self.meta_path(key)?] {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }
}
