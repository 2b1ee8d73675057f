//! Versioned content and the global block chain.
//!
//! Every write produces one immutable [`Content`] version, linked to the
//! version it replaces, and one [`Block`] appended to a single chain that
//! totally orders all writes. Blocks are numbered contiguously from 1 and
//! each links to its predecessor by ref.
//!
//! # Design Rules
//!
//! 1. Back-references (previous version, previous block) are resolved by
//!    ref lookups through the store, never held in memory.
//! 2. The chain head is the only mutable state. Appends read and replace it
//!    inside one exclusive section per [`BlockChain`].
//! 3. Finding the latest version of an id is the index's job; the chain is
//!    never scanned for it.
//! 4. Reaching the start of a history or chain is a typed, expected result
//!    ([`LedgerError::NoPreviousVersion`], [`LedgerError::NoPreviousBlock`]).

pub mod chain;
pub mod content;
pub mod error;
pub mod validation;

pub use chain::{Block, BlockChain, ChainHead, Exclusion, Walk};
pub use content::{read_latest, write_version, Content, History};
pub use error::{LedgerError, LedgerResult};
pub use validation::{ChainReport, ChainVerifier, Violation, ViolationKind};
