//! Citation resolution: dedup, membership resolution, metadata enrichment.

use std::collections::HashSet;

use gl_domain::citation::{Citation, RawCitation};
use gl_domain::error::Result;
use gl_upstream::UpstreamApi;

use crate::membership::MembershipIndexCache;
use crate::metadata::MetadataCache;

/// Collapse raw citations by `(file_id, quote)`, preserving first-seen
/// order. Same file with different quotes stays distinct.
pub fn dedup_citations(raw: Vec<RawCitation>) -> Vec<RawCitation> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut out = Vec::new();
    for citation in raw {
        if seen.insert((citation.file_id.clone(), citation.quote.clone())) {
            out.push(citation);
        }
    }
    out
}

/// Turn raw citations into enriched ones.
///
/// Membership resolution goes through the TTL-cached index and propagates
/// upstream failures; metadata enrichment is best-effort and leaves fields
/// unset when nothing is known. Output order follows the deduplicated
/// input order.
pub async fn resolve_citations(
    upstream: &dyn UpstreamApi,
    memberships: &MembershipIndexCache,
    metadata: &MetadataCache,
    collection_id: &str,
    raw: Vec<RawCitation>,
) -> Result<Vec<Citation>> {
    let deduped = dedup_citations(raw);
    if deduped.is_empty() {
        return Ok(Vec::new());
    }

    let file_ids: Vec<String> = deduped
        .iter()
        .map(|c| c.file_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let resolved = memberships
        .resolve(upstream, collection_id, &file_ids)
        .await?;

    let mut out = Vec::with_capacity(deduped.len());
    for citation in deduped {
        let meta = metadata.get(upstream, &citation.file_id).await;
        out.push(Citation {
            membership_id: resolved.get(&citation.file_id).cloned(),
            filename: meta.as_ref().map(|m| m.filename.clone()),
            size_bytes: meta.as_ref().map(|m| m.size_bytes),
            file_id: citation.file_id,
            quote: citation.quote,
        });
    }
    Ok(out)
}
