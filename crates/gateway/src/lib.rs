//! HTTP gateway wiring: app state, bootstrap, CLI and the axum surface.
//! The interesting behavior lives in `gl-engine` and `gl-mirror`; this
//! crate only adapts it to HTTP.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod state;
