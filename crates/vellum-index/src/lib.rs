//! Searchable metadata for Vellum content versions.
//!
//! Queries are boolean trees of [`Constraint`]s, built either with the
//! [`Query`] builder or parsed from user input with [`Query::parse`]. Any
//! backend implementing [`Index`] answers them; [`InMemoryIndex`] is the
//! built-in one.
//!
//! ```
//! use vellum_index::{eq, gt, Query};
//!
//! let q = Query::new().and([eq("kind", "note"), gt("rank", "3")]);
//! assert_eq!(q, Query::parse("kind:note gt:rank:3").unwrap());
//! ```

pub mod error;
pub mod memory;
pub mod parse;
pub mod query;
pub mod traits;

pub use error::{IndexError, IndexResult, QueryError};
pub use memory::InMemoryIndex;
pub use query::{eq, fts, gt, gte, lt, lte, ne, text, Constraint, Node, Operator, Query, Value};
pub use traits::{Entries, EntryQuery, Index, DEFAULT_ENTRY_LIMIT};
