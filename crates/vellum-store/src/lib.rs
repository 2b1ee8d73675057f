//! Content-addressed object storage for Vellum.
//!
//! Every object Vellum persists -- raw chunks, Parts pages, Data nodes,
//! Content versions and Blocks -- is stored as immutable bytes identified by
//! the [`Ref`](vellum_types::Ref) of those bytes.
//!
//! # Records
//!
//! Structured objects are encoded as schema-tagged [`Record`]s:
//!
//! - [`PartsNode`] -- a page of chunk refs linked to the previous page
//! - [`DataNode`] -- the self-describing terminal node of a blob
//! - [`ContentRecord`] -- one version of a logical record
//! - [`BlockRecord`] -- one entry of the global block chain
//!
//! # Storage Backends
//!
//! All backends implement the [`Store`] trait:
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`DiskStore`] -- one file per object under a root directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. `write_hash` never stores bytes that do not hash to the given ref.
//! 3. Concurrent reads and writes are always safe; writes are idempotent.
//! 4. The store never interprets object contents -- records are encoded and
//!    decoded on top of it.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod memory;
pub mod record;
pub mod traits;

pub use disk::DiskStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use record::{
    BlockRecord, ContentRecord, DataNode, PartsNode, Record, RecordStore, SchemaType, PAGE_SIZE,
};
pub use traits::{RefIter, Store};
