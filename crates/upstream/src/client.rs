//! HTTP client for the assistants backend.
//!
//! A thin, retry-free adapter: every non-success status is surfaced to the
//! caller verbatim as [`Error::Upstream`] with the response body attached.
//! The caller (UI) decides whether to resubmit.

use async_trait::async_trait;
use serde_json::Value;

use gl_domain::citation::FileMetadata;
use gl_domain::config::UpstreamConfig;
use gl_domain::error::{Error, Result};

use crate::types::{MembershipPage, RunSnapshot, ThreadMessage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The seam between the orchestration engine and the assistants backend.
///
/// The engine only ever talks to this trait; [`HttpUpstream`] is the real
/// implementation and tests substitute an in-memory fake.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Create a grounded agent bound to exactly one collection.
    /// Returns the opaque agent id.
    async fn create_assistant(&self, collection_id: &str) -> Result<String>;

    /// Create an empty conversation thread. Returns the thread id.
    async fn create_thread(&self) -> Result<String>;

    /// Append a user message to a thread.
    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Start a run of `assistant_id` against the thread's accumulated state.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunSnapshot>;

    /// Fetch the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunSnapshot>;

    /// Fetch the newest messages of a thread, newest first, bounded by `limit`.
    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<ThreadMessage>>;

    /// Descriptive metadata for an uploaded file. `Ok(None)` on 404.
    async fn file_metadata(&self, file_id: &str) -> Result<Option<FileMetadata>>;

    /// Upload raw bytes as a new file. Returns the upload file id.
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<String>;

    /// One page of a collection's membership listing, resuming at `after`.
    async fn list_collection_page(
        &self,
        collection_id: &str,
        after: Option<&str>,
    ) -> Result<MembershipPage>;

    /// Attach an uploaded file to a collection. Returns the membership id.
    async fn attach_file(&self, collection_id: &str, file_id: &str) -> Result<String>;

    /// Remove a file's attachment record from a collection.
    async fn detach_file(&self, collection_id: &str, membership_id: &str) -> Result<()>;

    /// Delete an uploaded file outright.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Delete a whole collection.
    async fn delete_collection(&self, collection_id: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct HttpUpstream {
    base_url: String,
    api_key: String,
    model: String,
    instructions: String,
    client: reqwest::Client,
}

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

impl HttpUpstream {
    /// Build a client from config. Returns `Ok(None)` when the credential
    /// environment variable is unset — the gateway then answers 503 for
    /// grounded chat instead of failing at boot.
    pub fn from_config(cfg: &UpstreamConfig) -> Result<Option<Self>> {
        let api_key = match std::env::var(&cfg.api_key_env) {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return Ok(None),
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Some(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            instructions: cfg.instructions.clone(),
            client,
        }))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Send a request, surfacing non-success statuses verbatim.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Value> {
        let resp = self.authed(builder).send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let body = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn id_of(value: &Value, context: &str) -> Result<String> {
        value
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| Error::Http(format!("{context}: response carried no id")))
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstream {
    async fn create_assistant(&self, collection_id: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "instructions": self.instructions,
            "tools": [{"type": "file_search"}],
            "tool_resources": {
                "file_search": {"vector_store_ids": [collection_id]}
            },
        });
        tracing::debug!(collection_id, "creating grounded assistant");
        let resp = self
            .send(self.client.post(self.url("/assistants")).json(&body))
            .await?;
        Self::id_of(&resp, "create assistant")
    }

    async fn create_thread(&self) -> Result<String> {
        let resp = self
            .send(
                self.client
                    .post(self.url("/threads"))
                    .json(&serde_json::json!({})),
            )
            .await?;
        Self::id_of(&resp, "create thread")
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({"role": "user", "content": text});
        self.send(
            self.client
                .post(self.url(&format!("/threads/{thread_id}/messages")))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunSnapshot> {
        let body = serde_json::json!({"assistant_id": assistant_id});
        let resp = self
            .send(
                self.client
                    .post(self.url(&format!("/threads/{thread_id}/runs")))
                    .json(&body),
            )
            .await?;
        Ok(serde_json::from_value(resp)?)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunSnapshot> {
        let resp = self
            .send(
                self.client
                    .get(self.url(&format!("/threads/{thread_id}/runs/{run_id}"))),
            )
            .await?;
        Ok(serde_json::from_value(resp)?)
    }

    async fn list_messages(&self, thread_id: &str, limit: u32) -> Result<Vec<ThreadMessage>> {
        let limit = limit.to_string();
        let resp = self
            .send(
                self.client
                    .get(self.url(&format!("/threads/{thread_id}/messages")))
                    .query(&[("order", "desc"), ("limit", limit.as_str())]),
            )
            .await?;
        let data = resp.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(data)?)
    }

    async fn file_metadata(&self, file_id: &str) -> Result<Option<FileMetadata>> {
        let resp = self
            .send(self.client.get(self.url(&format!("/files/{file_id}"))))
            .await;
        match resp {
            Ok(v) => {
                let filename = v
                    .get("filename")
                    .and_then(|f| f.as_str())
                    .unwrap_or_default()
                    .to_string();
                let size_bytes = v.get("bytes").and_then(|b| b.as_u64()).unwrap_or(0);
                Ok(Some(FileMetadata {
                    filename,
                    size_bytes,
                }))
            }
            Err(Error::Upstream { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(from_reqwest)?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", part);
        let resp = self
            .send(self.client.post(self.url("/files")).multipart(form))
            .await?;
        Self::id_of(&resp, "upload file")
    }

    async fn list_collection_page(
        &self,
        collection_id: &str,
        after: Option<&str>,
    ) -> Result<MembershipPage> {
        let mut query: Vec<(&str, String)> = vec![("limit", "100".into())];
        if let Some(cursor) = after {
            query.push(("after", cursor.into()));
        }
        let resp = self
            .send(
                self.client
                    .get(self.url(&format!("/vector_stores/{collection_id}/files")))
                    .query(&query),
            )
            .await?;
        Ok(serde_json::from_value(resp)?)
    }

    async fn attach_file(&self, collection_id: &str, file_id: &str) -> Result<String> {
        let body = serde_json::json!({"file_id": file_id});
        let resp = self
            .send(
                self.client
                    .post(self.url(&format!("/vector_stores/{collection_id}/files")))
                    .json(&body),
            )
            .await?;
        Self::id_of(&resp, "attach file")
    }

    async fn detach_file(&self, collection_id: &str, membership_id: &str) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/vector_stores/{collection_id}/files/{membership_id}"))),
        )
        .await?;
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/files/{file_id}"))))
            .await?;
        Ok(())
    }

    async fn delete_collection(&self, collection_id: &str) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/vector_stores/{collection_id}"))),
        )
        .await?;
        Ok(())
    }
}
