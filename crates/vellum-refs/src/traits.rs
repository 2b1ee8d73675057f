//! The [`HeadStore`] trait.

use crate::error::Result;
use crate::types::Head;

/// Durable storage for the single chain head.
///
/// Implementations must be thread-safe and `set` must be atomic: a reader
/// sees either the previous head or the new one, never a mix. Callers are
/// responsible for serializing read-modify-write sequences.
pub trait HeadStore: Send + Sync {
    /// Read the current head. `Ok(None)` means nothing was ever appended.
    fn get(&self) -> Result<Option<Head>>;

    /// Replace the head.
    fn set(&self, head: &Head) -> Result<()>;
}

impl<H: HeadStore + ?Sized> HeadStore for std::sync::Arc<H> {
    fn get(&self) -> Result<Option<Head>> {
        (**self).get()
    }

    fn set(&self, head: &Head) -> Result<()> {
        (**self).set(head)
    }
}
