//! In-memory head store for testing and ephemeral use.

use std::sync::RwLock;

use crate::error::{RefError, Result};
use crate::traits::HeadStore;
use crate::types::Head;

/// An in-memory implementation of [`HeadStore`]. The head is lost when the
/// store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryHeadStore {
    head: RwLock<Option<Head>>,
}

impl InMemoryHeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeadStore for InMemoryHeadStore {
    fn get(&self) -> Result<Option<Head>> {
        let head = self
            .head
            .read()
            .map_err(|_| RefError::Poisoned)?;
        Ok(*head)
    }

    fn set(&self, head: &Head) -> Result<()> {
        let mut current = self
            .head
            .write()
            .map_err(|_| RefError::Poisoned)?;
        *current = Some(*head);
        Ok(())
    }
}
