//! Citation source endpoint: streams mirrored bytes back to the viewer,
//! honoring byte-range requests.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use gl_domain::error::Error;
use gl_engine::membership::looks_like_file_id;
use gl_mirror::ByteRange;

use crate::api::ApiResult;
use crate::state::AppState;

/// `GET /api/collections/:collection_id/source/:source_id`
///
/// `source_id` may be either a membership id or an upstream file id; the
/// file-id form is resolved through the membership index. Everything here
/// is a soft path: unconfigured mirror, unresolvable id and absent object
/// all answer 404 without touching chat behavior.
pub async fn fetch(
    State(state): State<AppState>,
    Path((collection_id, source_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let mirror = state.mirror()?;

    let membership_id = if looks_like_file_id(&source_id) {
        let engine = state
            .engine
            .as_ref()
            .ok_or_else(|| Error::NotFound("cannot resolve file id without upstream".into()))?;
        engine
            .memberships()
            .resolve_one(engine.upstream(), &collection_id, &source_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("{source_id} is not in collection {collection_id}"))
            })?
    } else {
        source_id
    };

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(ByteRange::parse_header);

    let source = mirror
        .fetch_source(&collection_id, &membership_id, range)
        .await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::ACCEPT_RANGES,
        header::HeaderValue::from_static("bytes"),
    );
    response_headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(disposition) =
        format!("inline; filename=\"{}\"", source.filename).parse::<header::HeaderValue>()
    {
        response_headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    let status = match source.range {
        Some((start, end)) => {
            let content_range = format!("bytes {start}-{end}/{}", source.total_len);
            if let Ok(value) = content_range.parse::<header::HeaderValue>() {
                response_headers.insert(header::CONTENT_RANGE, value);
            }
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };

    Ok((status, response_headers, source.bytes).into_response())
}
