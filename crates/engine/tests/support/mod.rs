//! Scripted in-memory stand-in for the assistants backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use gl_domain::citation::FileMetadata;
use gl_domain::error::Result;
use gl_upstream::types::{MembershipEntry, MembershipPage, RunSnapshot, RunStatus, ThreadMessage};
use gl_upstream::UpstreamApi;

const PAGE_SIZE: usize = 2;

#[derive(Default)]
pub struct FakeUpstream {
    pub create_assistant_calls: AtomicU32,
    pub run_polls: AtomicU32,
    pub list_page_calls: AtomicU32,
    pub metadata_calls: AtomicU32,

    /// Successive `get_run` observations; the last one repeats forever.
    pub run_script: Mutex<VecDeque<RunSnapshot>>,
    /// Messages returned by `list_messages`, newest first.
    pub messages: Mutex<Vec<ThreadMessage>>,
    /// Full membership listing, paginated two entries per page.
    pub memberships: Mutex<Vec<MembershipEntry>>,
    /// File metadata; ids absent from the map answer 404 (`None`).
    pub metadata: Mutex<HashMap<String, FileMetadata>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_run(&self, statuses: &[RunStatus]) {
        let mut script = self.run_script.lock();
        script.clear();
        for status in statuses {
            script.push_back(RunSnapshot {
                id: "run_1".into(),
                status: *status,
                last_error: None,
            });
        }
    }

    pub fn script_run_failure(&self, message: &str) {
        let mut script = self.run_script.lock();
        script.clear();
        script.push_back(RunSnapshot {
            id: "run_1".into(),
            status: RunStatus::Failed,
            last_error: Some(gl_upstream::types::RunError {
                code: Some("server_error".into()),
                message: Some(message.into()),
            }),
        });
    }

    pub fn add_membership(&self, membership_id: Option<&str>, file_id: Option<&str>) {
        self.memberships.lock().push(MembershipEntry {
            id: membership_id.map(String::from),
            file_id: file_id.map(String::from),
        });
    }

    pub fn add_metadata(&self, file_id: &str, filename: &str, size_bytes: u64) {
        self.metadata.lock().insert(
            file_id.into(),
            FileMetadata {
                filename: filename.into(),
                size_bytes,
            },
        );
    }

    pub fn set_assistant_reply(&self, value: &str, annotations_json: &str) {
        let msg: ThreadMessage = serde_json::from_str(&format!(
            r#"{{
                "id": "msg_1",
                "role": "assistant",
                "content": [{{
                    "type": "text",
                    "text": {{"value": {}, "annotations": {}}}
                }}]
            }}"#,
            serde_json::to_string(value).unwrap(),
            annotations_json,
        ))
        .unwrap();
        *self.messages.lock() = vec![msg];
    }
}

#[async_trait]
impl UpstreamApi for FakeUpstream {
    async fn create_assistant(&self, collection_id: &str) -> Result<String> {
        let n = self.create_assistant_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("asst_{collection_id}_{n}"))
    }

    async fn create_thread(&self) -> Result<String> {
        Ok("th_1".into())
    }

    async fn append_user_message(&self, _thread_id: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<RunSnapshot> {
        Ok(RunSnapshot {
            id: "run_1".into(),
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn get_run(&self, _thread_id: &str, _run_id: &str) -> Result<RunSnapshot> {
        self.run_polls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.run_script.lock();
        if script.len() > 1 {
            Ok(script.pop_front().unwrap())
        } else {
            Ok(script
                .front()
                .cloned()
                .unwrap_or_else(|| RunSnapshot {
                    id: "run_1".into(),
                    status: RunStatus::InProgress,
                    last_error: None,
                }))
        }
    }

    async fn list_messages(&self, _thread_id: &str, limit: u32) -> Result<Vec<ThreadMessage>> {
        let messages = self.messages.lock();
        Ok(messages.iter().take(limit as usize).cloned().collect())
    }

    async fn file_metadata(&self, file_id: &str) -> Result<Option<FileMetadata>> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata.lock().get(file_id).cloned())
    }

    async fn upload_file(&self, _filename: &str, _bytes: Vec<u8>) -> Result<String> {
        Ok("file_new".into())
    }

    async fn list_collection_page(
        &self,
        _collection_id: &str,
        after: Option<&str>,
    ) -> Result<MembershipPage> {
        self.list_page_calls.fetch_add(1, Ordering::SeqCst);
        let entries = self.memberships.lock();

        let start = match after {
            None => 0,
            Some(cursor) => {
                entries
                    .iter()
                    .position(|e| e.id.as_deref() == Some(cursor))
                    .map(|i| i + 1)
                    .unwrap_or(entries.len())
            }
        };
        let page: Vec<MembershipEntry> =
            entries.iter().skip(start).take(PAGE_SIZE).cloned().collect();
        let has_more = start + page.len() < entries.len();
        let last_id = page.last().and_then(|e| e.id.clone());

        Ok(MembershipPage {
            data: page,
            has_more,
            last_id,
        })
    }

    async fn attach_file(&self, _collection_id: &str, file_id: &str) -> Result<String> {
        let membership = format!("vsf_{}", file_id.trim_start_matches("file_"));
        self.memberships.lock().push(MembershipEntry {
            id: Some(membership.clone()),
            file_id: Some(file_id.into()),
        });
        Ok(membership)
    }

    async fn detach_file(&self, _collection_id: &str, membership_id: &str) -> Result<()> {
        self.memberships
            .lock()
            .retain(|e| e.id.as_deref() != Some(membership_id));
        Ok(())
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.metadata.lock().remove(file_id);
        Ok(())
    }

    async fn delete_collection(&self, _collection_id: &str) -> Result<()> {
        Ok(())
    }
}
