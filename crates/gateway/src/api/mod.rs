//! HTTP surface of the gateway.
//!
//! - `POST   /api/chat/grounded`                                   — grounded turn
//! - `POST   /api/collections/:collection_id/files`                — upload + attach + mirror
//! - `DELETE /api/collections/:collection_id/files/:membership_id` — detach + prune mirror
//! - `DELETE /api/collections/:collection_id`                      — drop collection + mirror
//! - `GET    /api/collections/:collection_id/source/:source_id`    — ranged citation source
//! - `GET    /healthz`                                             — liveness

pub mod chat;
pub mod files;
pub mod sources;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use gl_domain::error::Error;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/chat/grounded", post(chat::grounded_chat))
        .route("/api/collections/:collection_id/files", post(files::upload))
        .route(
            "/api/collections/:collection_id/files/:membership_id",
            delete(files::detach),
        )
        .route("/api/collections/:collection_id", delete(files::delete_collection))
        .route(
            "/api/collections/:collection_id/source/:source_id",
            get(sources::fetch),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error mapping
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Domain error adapted to an HTTP response: `{ "error": "<message>" }`
/// with the status the taxonomy prescribes.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::RunTimeout => StatusCode::GATEWAY_TIMEOUT,
        Error::RunFailed(_) | Error::Upstream { .. } | Error::NoReplyFound => {
            StatusCode::BAD_GATEWAY
        }
        Error::Io(_) | Error::Json(_) | Error::Http(_) | Error::Timeout(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.0, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_documented_statuses() {
        assert_eq!(
            status_for(&Error::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&Error::Config("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(&Error::RunTimeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status_for(&Error::RunFailed("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&Error::Upstream {
                status: 429,
                body: "rate limited".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&Error::NoReplyFound), StatusCode::BAD_GATEWAY);
    }
}
