//! Lazy registry of grounded agents, one per document collection.

use std::collections::HashMap;

use parking_lot::Mutex;

use gl_domain::error::Result;
use gl_upstream::UpstreamApi;

/// Maps a collection id to the agent configured to ground on it.
///
/// An agent's binding to its collection is treated as permanent for the
/// process lifetime: no eviction, no refresh. A deleted collection leaves a
/// stale entry behind; the next run against it fails upstream and the
/// caller sees that failure.
#[derive(Default)]
pub struct AssistantRegistry {
    agents: Mutex<HashMap<String, String>>,
}

impl AssistantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the agent for `collection_id`, creating it on first use.
    ///
    /// A cache hit issues no upstream call. Creation failures are not
    /// cached, so the next call retries. Two concurrent first calls may
    /// both create an agent; the first insert wins and the duplicate is
    /// simply unused.
    pub async fn get_or_create(
        &self,
        upstream: &dyn UpstreamApi,
        collection_id: &str,
    ) -> Result<String> {
        if let Some(agent_id) = self.agents.lock().get(collection_id) {
            return Ok(agent_id.clone());
        }

        let agent_id = upstream.create_assistant(collection_id).await?;
        tracing::info!(collection_id, agent_id = %agent_id, "grounded agent created");

        let mut agents = self.agents.lock();
        Ok(agents
            .entry(collection_id.to_string())
            .or_insert(agent_id)
            .clone())
    }
}
