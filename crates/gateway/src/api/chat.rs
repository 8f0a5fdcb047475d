//! Grounded chat endpoint — the primary interface for document-grounded turns.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use gl_domain::citation::Citation;

use crate::api::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GroundedChatRequest {
    /// User message text.
    pub message: String,
    /// Document collection to ground on.
    pub collection_id: String,
    /// Existing thread to continue; omitted on the first turn. The client
    /// is the source of truth for thread continuity — hold on to the
    /// `thread_id` the response returns.
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroundedChatResponse {
    pub reply: String,
    pub thread_id: String,
    pub citations: Vec<Citation>,
}

pub async fn grounded_chat(
    State(state): State<AppState>,
    Json(body): Json<GroundedChatRequest>,
) -> ApiResult<Json<GroundedChatResponse>> {
    let engine = state.engine()?;
    let outcome = engine
        .run_turn(&body.collection_id, &body.message, body.thread_id)
        .await?;

    Ok(Json(GroundedChatResponse {
        reply: outcome.reply,
        thread_id: outcome.thread_id,
        citations: outcome.citations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_id_is_optional_in_the_request() {
        let body: GroundedChatRequest = serde_json::from_str(
            r#"{"message": "hi", "collection_id": "cs_1"}"#,
        )
        .unwrap();
        assert!(body.thread_id.is_none());

        let body: GroundedChatRequest = serde_json::from_str(
            r#"{"message": "hi", "collection_id": "cs_1", "thread_id": "th_7"}"#,
        )
        .unwrap();
        assert_eq!(body.thread_id.as_deref(), Some("th_7"));
    }
}
