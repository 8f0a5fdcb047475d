//! Shared domain types for Groundline: the error taxonomy, the config
//! model, and citation types that cross crate boundaries.

pub mod citation;
pub mod config;
pub mod error;
