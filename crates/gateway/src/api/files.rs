//! Document management: upload + attach, detach, and collection deletion,
//! each keeping the mirror and the metadata cache in step with upstream.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use gl_domain::citation::FileMetadata;
use gl_domain::error::Error;

use crate::api::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub membership_id: String,
    pub filename: String,
    pub size_bytes: u64,
}

/// `POST /api/collections/:collection_id/files?filename=…`
///
/// Uploads the raw body, attaches it to the collection, primes the
/// metadata cache with the filename/size we already know, and mirrors the
/// bytes when a mirror is configured. Mirror failures only log — the
/// upstream attachment already succeeded and stays authoritative.
pub async fn upload(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    if query.filename.trim().is_empty() {
        return Err(Error::BadRequest("filename must not be empty".into()).into());
    }
    if body.is_empty() {
        return Err(Error::BadRequest("upload body must not be empty".into()).into());
    }

    let engine = state.engine()?;
    let upstream = engine.upstream();
    let size_bytes = body.len() as u64;

    let file_id = upstream.upload_file(&query.filename, body.to_vec()).await?;
    let membership_id = upstream.attach_file(&collection_id, &file_id).await?;
    engine.metadata().prime(
        &file_id,
        FileMetadata {
            filename: query.filename.clone(),
            size_bytes,
        },
    );
    tracing::info!(
        collection_id,
        file_id = %file_id,
        membership_id = %membership_id,
        size_bytes,
        "file attached"
    );

    if let Ok(mirror) = state.mirror() {
        if let Err(e) = mirror
            .mirror_attachment(&collection_id, &membership_id, &file_id, &query.filename, &body)
            .await
        {
            tracing::warn!(file_id = %file_id, error = %e, "mirror write failed");
        }
    }

    Ok(Json(UploadResponse {
        file_id,
        membership_id,
        filename: query.filename,
        size_bytes,
    }))
}

/// `DELETE /api/collections/:collection_id/files/:membership_id`
///
/// Detaching also deletes the underlying upload, so the file does not
/// linger as orphaned upstream storage. The file id must be resolved
/// before the detach removes it from the listing. The upload delete is
/// best-effort: the membership is already gone either way, and a
/// leftover upload only costs storage.
pub async fn detach(
    State(state): State<AppState>,
    Path((collection_id, membership_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let engine = state.engine()?;
    let upstream = engine.upstream();

    let file_id = engine
        .memberships()
        .file_id_for(upstream, &collection_id, &membership_id)
        .await?;
    upstream.detach_file(&collection_id, &membership_id).await?;

    if let Some(file_id) = &file_id {
        if let Err(e) = upstream.delete_file(file_id).await {
            tracing::warn!(file_id = %file_id, error = %e, "upload delete failed");
        }
    }

    let mut mirrored_deleted = 0;
    if let Ok(mirror) = state.mirror() {
        mirrored_deleted = mirror.delete_membership(&collection_id, &membership_id).await?;
    }

    Ok(Json(serde_json::json!({
        "detached": membership_id,
        "deleted_file": file_id,
        "mirrored_objects_deleted": mirrored_deleted,
    })))
}

/// `DELETE /api/collections/:collection_id`
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let engine = state.engine()?;
    engine.upstream().delete_collection(&collection_id).await?;

    let mut mirrored_deleted = 0;
    if let Ok(mirror) = state.mirror() {
        mirrored_deleted = mirror.delete_collection(&collection_id).await?;
    }
    tracing::info!(collection_id, mirrored_deleted, "collection deleted");

    Ok(Json(serde_json::json!({
        "deleted": collection_id,
        "mirrored_objects_deleted": mirrored_deleted,
    })))
}
