//! Content hashing for Vellum.
//!
//! Provides the [`Hasher`] that maps bytes to a [`Ref`](vellum_types::Ref)
//! and the streaming [`Checksum`] used to fingerprint whole payloads
//! independently of how they were chunked.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod hasher;

pub use hasher::{Checksum, Hasher};
