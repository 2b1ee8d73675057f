//! Foundation types for Vellum.
//!
//! This crate provides the identifiers and small value types shared by every
//! other Vellum crate.
//!
//! # Key Types
//!
//! - [`Ref`] — Algorithm-tagged content address of an immutable stored object
//! - [`Algorithm`] — Hash algorithm named by a [`Ref`] tag
//! - [`Fields`] — Sorted, indexable metadata attached to a content version

pub mod error;
pub mod fields;
pub mod reference;

pub use error::TypeError;
pub use fields::Fields;
pub use reference::{Algorithm, Ref};
