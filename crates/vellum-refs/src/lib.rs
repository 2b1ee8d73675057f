//! The chain head: the only mutable pointer in Vellum.
//!
//! Every other object is immutable and content addressed. The [`Head`]
//! names the newest block of the chain and its number, and is owned by the
//! block chain, which reads and replaces it inside its exclusive section.
//!
//! # Modules
//!
//! - [`error`] — Error types for head operations
//! - [`types`] — The [`Head`] pointer
//! - [`traits`] — The [`HeadStore`] trait
//! - [`memory`] — In-memory [`InMemoryHeadStore`] for tests
//! - [`file`] — Durable [`FileHeadStore`]

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use file::FileHeadStore;
pub use memory::InMemoryHeadStore;
pub use traits::HeadStore;
pub use types::Head;
