//! Blobs: arbitrarily large payloads assembled from chunk refs.
//!
//! Writing a blob is three steps:
//!
//! 1. a [`Roller`](vellum_chunk::Roller) splits the payload into chunks,
//! 2. the [`ChunkWriter`] stores each chunk and accumulates a
//!    [`ChunkSummary`] (ordered refs, size, checksum),
//! 3. [`assemble`] turns the refs into Parts pages plus a terminal Data
//!    node, whose ref is the blob handle.
//!
//! [`read_refs`] is the exact inverse of [`assemble`], and [`BlobReader`]
//! streams the payload back chunk by chunk.

pub mod error;
pub mod parts;
pub mod reader;
pub mod writer;

pub use error::{BlobError, BlobResult};
pub use parts::{assemble, read_refs, Assembled};
pub use reader::{verify_blob, BlobReader};
pub use writer::{write_blob, ChunkSummary, ChunkWriter};
