//! Orchestration core: turns a prompt plus a document collection into a
//! grounded reply with resolved citations, masking the poll-based run
//! execution model of the assistants backend.
//!
//! The pieces, leaf to root: [`registry`] (lazy grounded agents),
//! [`poll`] (the one waiting primitive), [`extract`] (reply text +
//! raw annotations), [`membership`] / [`metadata`] (the two caches
//! reconciling identifier namespaces), [`citations`] (dedup + enrichment)
//! and [`turn`] (the executor tying them together).

pub mod citations;
pub mod extract;
pub mod membership;
pub mod metadata;
pub mod poll;
pub mod registry;
pub mod turn;

pub use turn::{Engine, TurnOutcome};
