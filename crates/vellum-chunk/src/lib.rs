//! Content-defined chunking.
//!
//! A [`Roller`] splits a byte stream into [`Chunk`]s at positions chosen by
//! a rolling checksum over the last 64 bytes. Because boundaries depend on
//! content rather than offsets, an edit only disturbs the chunks around it
//! and the rest of the payload re-produces identical chunks, which is what
//! gives cross-version deduplication.

pub mod config;
pub mod error;
pub mod roller;
pub mod rollsum;

pub use config::ChunkerConfig;
pub use error::{ChunkError, ChunkResult};
pub use roller::{Chunk, Roller};
pub use rollsum::Rollsum;
