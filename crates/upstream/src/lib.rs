//! Typed client for the assistants-style backend.
//!
//! Exposes the [`UpstreamApi`] trait consumed by the orchestration engine
//! and the [`HttpUpstream`] implementation that speaks the real wire
//! protocol. No retries live here: a failed call is the caller's problem.

pub mod client;
pub mod types;

pub use client::{HttpUpstream, UpstreamApi};
