//! High-level SDK for Vellum.
//!
//! [`Vellum`] ties the object store, the chunker, the content ledger, the
//! block chain and the index together behind one API. This is the main
//! entry point for applications embedding Vellum.

pub mod config;
pub mod error;
pub mod request;
pub mod vellum;

pub use config::VellumConfig;
pub use error::{SdkError, SdkResult};
pub use request::WriteRequest;
pub use vellum::{Chain, Vellum};

// Re-export key types
pub use vellum_chunk::ChunkerConfig;
pub use vellum_index::{Entries, EntryQuery, Query};
pub use vellum_ledger::{Block, ChainReport, Content, Violation, ViolationKind};
pub use vellum_types::{Fields, Ref};
