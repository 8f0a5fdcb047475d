//! Object-store collaborator boundary.
//!
//! The mirror only needs four operations: put, prefixed list with
//! continuation, bulk delete, and ranged get. Anything that can do those
//! can back the mirror; [`crate::fs::FsObjectStore`] is the bundled
//! implementation.

use std::collections::HashMap;

use async_trait::async_trait;

use gl_domain::error::{Error, Result};

/// Upper bound on keys returned per list page.
pub const LIST_PAGE_SIZE: usize = 1000;

/// A parsed HTTP byte range, before resolution against an object's length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=s-` — from offset to end.
    From(u64),
    /// `bytes=s-e` — inclusive span.
    Span(u64, u64),
    /// `bytes=-n` — final n bytes.
    Suffix(u64),
}

impl ByteRange {
    /// Parse a `Range` header value. Returns `None` for anything that is
    /// not a single well-formed bytes range (multipart ranges are not
    /// supported; the caller then serves the whole object).
    pub fn parse_header(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?.trim();
        if spec.contains(',') {
            return None;
        }
        let (start, end) = spec.split_once('-')?;
        match (start.trim(), end.trim()) {
            ("", suffix) => suffix.parse().ok().map(ByteRange::Suffix),
            (from, "") => from.parse().ok().map(ByteRange::From),
            (from, to) => {
                let (from, to) = (from.parse().ok()?, to.parse().ok()?);
                Some(ByteRange::Span(from, to))
            }
        }
    }

    /// Resolve against an object of `total_len` bytes into an inclusive
    /// `(start, end)` pair, or an error when the range is unsatisfiable.
    pub fn resolve(self, total_len: u64) -> Result<(u64, u64)> {
        let unsatisfiable =
            || Error::BadRequest(format!("unsatisfiable byte range for {total_len}-byte object"));
        if total_len == 0 {
            return Err(unsatisfiable());
        }
        match self {
            ByteRange::From(start) if start < total_len => Ok((start, total_len - 1)),
            ByteRange::Span(start, end) if start < total_len && start <= end => {
                Ok((start, end.min(total_len - 1)))
            }
            ByteRange::Suffix(n) if n > 0 => Ok((total_len.saturating_sub(n), total_len - 1)),
            _ => Err(unsatisfiable()),
        }
    }
}

/// Receipt for a stored object.
#[derive(Debug, Clone)]
pub struct PutReceipt {
    /// Hex sha256 of the stored bytes.
    pub content_hash: String,
}

/// A (possibly partial) object read.
#[derive(Debug, Clone)]
pub struct ObjectRead {
    pub bytes: Vec<u8>,
    pub total_len: u64,
    /// Inclusive `(start, end)` actually served, `None` for a full read.
    pub range: Option<(u64, u64)>,
}

/// One page of a prefixed listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Keys in lexicographic order.
    pub keys: Vec<String>,
    /// Continuation token for the next page, when the listing is not
    /// exhausted.
    pub next: Option<String>,
}

/// Minimal object-store surface the mirror consumes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key` with auxiliary string metadata.
    async fn put(
        &self,
        key: &str,
        bytes: &[u8],
        metadata: &HashMap<String, String>,
    ) -> Result<PutReceipt>;

    /// Read an object, optionally restricted to a byte range.
    /// `Error::NotFound` when no object exists under `key`.
    async fn get_range(&self, key: &str, range: Option<ByteRange>) -> Result<ObjectRead>;

    /// List keys under `prefix`, resuming at `continuation`.
    async fn list(&self, prefix: &str, continuation: Option<&str>) -> Result<ListPage>;

    /// Delete the given keys. Keys that no longer exist are skipped.
    async fn delete(&self, keys: &[String]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_range_forms() {
        assert_eq!(ByteRange::parse_header("bytes=0-99"), Some(ByteRange::Span(0, 99)));
        assert_eq!(ByteRange::parse_header("bytes=100-"), Some(ByteRange::From(100)));
        assert_eq!(ByteRange::parse_header("bytes=-50"), Some(ByteRange::Suffix(50)));
    }

    #[test]
    fn rejects_malformed_and_multipart_ranges() {
        assert_eq!(ByteRange::parse_header("items=0-1"), None);
        assert_eq!(ByteRange::parse_header("bytes=0-1,5-9"), None);
        assert_eq!(ByteRange::parse_header("bytes=abc-"), None);
        assert_eq!(ByteRange::parse_header("bytes=-"), None);
    }

    #[test]
    fn resolves_and_clamps_spans() {
        assert_eq!(ByteRange::Span(0, 99).resolve(1000).unwrap(), (0, 99));
        assert_eq!(ByteRange::Span(900, 2000).resolve(1000).unwrap(), (900, 999));
        assert_eq!(ByteRange::From(990).resolve(1000).unwrap(), (990, 999));
        assert_eq!(ByteRange::Suffix(10).resolve(1000).unwrap(), (990, 999));
        assert_eq!(ByteRange::Suffix(5000).resolve(1000).unwrap(), (0, 999));
    }

    #[test]
    fn out_of_bounds_start_is_unsatisfiable() {
        assert!(ByteRange::From(1000).resolve(1000).is_err());
        assert!(ByteRange::Span(5, 2).resolve(1000).is_err());
        assert!(ByteRange::Suffix(0).resolve(1000).is_err());
        assert!(ByteRange::From(0).resolve(0).is_err());
    }
}
