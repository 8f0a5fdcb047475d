//! Durable mirror of uploaded document bytes, for byte-range retrieval
//! when a citation is opened.
//!
//! [`store::ObjectStore`] is the collaborator boundary (put, prefixed list
//! with continuation, bulk delete, ranged get); [`fs::FsObjectStore`] backs
//! it with a directory tree; [`adapter::MirrorAdapter`] owns the key scheme
//! and the byte-range semantics.

pub mod adapter;
pub mod fs;
pub mod store;

pub use adapter::{MirrorAdapter, SourceObject};
pub use fs::FsObjectStore;
pub use store::{ByteRange, ObjectStore};
