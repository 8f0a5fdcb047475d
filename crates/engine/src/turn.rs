//! The run executor: one grounded turn from prompt to enriched reply.

use std::sync::Arc;
use std::time::Duration;

use gl_domain::citation::Citation;
use gl_domain::config::RunConfig;
use gl_domain::error::{Error, Result};
use gl_upstream::UpstreamApi;

use crate::citations::resolve_citations;
use crate::extract::extract;
use crate::membership::MembershipIndexCache;
use crate::metadata::MetadataCache;
use crate::poll::poll_until;
use crate::registry::AssistantRegistry;

/// The result of one grounded turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Thread id the turn ran on — new when the caller supplied none. The
    /// caller owns thread continuity from here; we don't persist it.
    pub thread_id: String,
    pub reply: String,
    pub citations: Vec<Citation>,
}

/// Orchestration engine: owns every process-wide cache and drives runs.
///
/// One instance lives in the gateway's `AppState`; tests build fresh ones
/// around a fake upstream. All caches are in-memory and reconstructible
/// from upstream state, so a restart merely starts cold.
pub struct Engine {
    upstream: Arc<dyn UpstreamApi>,
    registry: AssistantRegistry,
    metadata: MetadataCache,
    memberships: MembershipIndexCache,
    poll_interval: Duration,
    run_budget: Duration,
    message_page: u32,
}

impl Engine {
    pub fn new(upstream: Arc<dyn UpstreamApi>, cfg: &RunConfig) -> Self {
        Self {
            upstream,
            registry: AssistantRegistry::new(),
            metadata: MetadataCache::new(),
            memberships: MembershipIndexCache::new(Duration::from_secs(
                cfg.membership_index_ttl_secs,
            )),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
            run_budget: Duration::from_millis(cfg.budget_ms),
            message_page: cfg.message_page,
        }
    }

    pub fn upstream(&self) -> &dyn UpstreamApi {
        self.upstream.as_ref()
    }

    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    pub fn memberships(&self) -> &MembershipIndexCache {
        &self.memberships
    }

    /// Run one grounded turn: submit the prompt, drive the run to a
    /// terminal state, extract the reply and resolve its citations.
    ///
    /// Steps before polling abort immediately on failure; nothing is
    /// retried. A client that disconnects mid-poll does not cancel the
    /// upstream run.
    pub async fn run_turn(
        &self,
        collection_id: &str,
        prompt: &str,
        thread_id: Option<String>,
    ) -> Result<TurnOutcome> {
        if prompt.trim().is_empty() {
            return Err(Error::BadRequest("message must not be empty".into()));
        }
        if collection_id.trim().is_empty() {
            return Err(Error::BadRequest("collection id must not be empty".into()));
        }

        let upstream = self.upstream.as_ref();
        let agent_id = self.registry.get_or_create(upstream, collection_id).await?;

        let thread_id = match thread_id.filter(|t| !t.trim().is_empty()) {
            Some(existing) => existing,
            None => {
                let created = upstream.create_thread().await?;
                tracing::debug!(thread_id = %created, "thread created");
                created
            }
        };

        upstream.append_user_message(&thread_id, prompt).await?;
        let run = upstream.create_run(&thread_id, &agent_id).await?;
        tracing::info!(
            collection_id,
            thread_id = %thread_id,
            run_id = %run.id,
            "run started"
        );

        let terminal = poll_until(
            || upstream.get_run(&thread_id, &run.id),
            |snapshot| snapshot.status.is_terminal(),
            self.poll_interval,
            self.run_budget,
        )
        .await?;

        if !terminal.status.is_success() {
            let reason = terminal.failure_reason();
            tracing::warn!(run_id = %run.id, status = terminal.status.as_str(), %reason, "run failed");
            return Err(Error::RunFailed(reason));
        }

        let messages = upstream.list_messages(&thread_id, self.message_page).await?;
        let assistant = messages.iter().find(|m| m.is_assistant());
        let (reply, raw_citations) = extract(assistant);
        if reply.is_empty() {
            return Err(Error::NoReplyFound);
        }

        let citations = resolve_citations(
            upstream,
            &self.memberships,
            &self.metadata,
            collection_id,
            raw_citations,
        )
        .await?;

        tracing::info!(
            run_id = %run.id,
            reply_chars = reply.len(),
            citations = citations.len(),
            "turn completed"
        );

        Ok(TurnOutcome {
            thread_id,
            reply,
            citations,
        })
    }
}
