use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;
use vellum_refs::{Head, HeadStore};
use vellum_store::{BlockRecord, RecordStore, Store};
use vellum_types::Ref;

use crate::content::Content;
use crate::error::{LedgerError, LedgerResult};
use crate::validation::{ChainReport, ChainVerifier};

/// One entry of the chain, as read back from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_block: Option<Ref>,
    pub content: Ref,
    /// Ref the block was read from. Not part of the stored record.
    pub hash: Ref,
}

impl Block {
    pub(crate) fn from_record(hash: Ref, record: BlockRecord) -> Self {
        Self {
            number: record.number,
            previous_block: record.previous_block,
            content: record.content,
            hash,
        }
    }

    /// Load the block stored under `hash`.
    pub fn read<S: Store + ?Sized>(store: &S, hash: &Ref) -> LedgerResult<Self> {
        Ok(Self::from_record(*hash, store.read_block(hash)?))
    }

    /// The stored form of this block.
    pub fn record(&self) -> BlockRecord {
        BlockRecord {
            number: self.number,
            previous_block: self.previous_block,
            content: self.content,
        }
    }

    /// Load the content version this block appended.
    pub fn content<S: Store + ?Sized>(&self, store: &S) -> LedgerResult<Content> {
        Content::read(store, &self.content)
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_block.is_none()
    }
}

/// Immutable snapshot of the chain state.
///
/// `number` is 0 and `block_ref` is `None` before the first append.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainHead {
    pub number: u64,
    pub block_ref: Option<Ref>,
}

impl ChainHead {
    pub fn is_empty(&self) -> bool {
        self.block_ref.is_none()
    }
}

impl From<Option<Head>> for ChainHead {
    fn from(head: Option<Head>) -> Self {
        match head {
            Some(head) => Self {
                number: head.number,
                block_ref: Some(head.block_ref),
            },
            None => Self::default(),
        }
    }
}

/// Whether appends run inside the chain's exclusive section.
///
/// Only fault-injection tests turn it off, to show the fork it prevents.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Exclusion {
    #[default]
    Enabled,
    Disabled,
}

/// The single append-only chain of a store.
///
/// One `BlockChain` must own the head of a store instance: appends are
/// serialized by a lock held by the chain, so two chains sharing a head
/// store can fork it.
pub struct BlockChain<S, H> {
    store: S,
    heads: H,
    append_lock: Mutex<()>,
    exclusion: Exclusion,
}

impl<S: Store, H: HeadStore> BlockChain<S, H> {
    pub fn new(store: S, heads: H) -> Self {
        Self {
            store,
            heads,
            append_lock: Mutex::new(()),
            exclusion: Exclusion::Enabled,
        }
    }

    #[doc(hidden)]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current chain state.
    pub fn snapshot(&self) -> LedgerResult<ChainHead> {
        Ok(self.heads.get()?.into())
    }

    /// Append a block referencing `content`.
    ///
    /// Reading the head, writing the block and replacing the head happen
    /// in one exclusive section, so concurrent appends get distinct,
    /// contiguous numbers. If the head update fails, the written block is
    /// left orphaned and the chain is unchanged.
    pub fn append(&self, content: Ref) -> LedgerResult<Block> {
        let _guard = match self.exclusion {
            Exclusion::Enabled => Some(
                self.append_lock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            ),
            Exclusion::Disabled => None,
        };

        let head = self.snapshot()?;
        let record = BlockRecord {
            number: head.number + 1,
            previous_block: head.block_ref,
            content,
        };
        let hash = self.store.write_record(record.clone())?;
        self.heads.set(&Head::new(hash, record.number))?;

        debug!(number = record.number, block = %hash.short(), content = %content.short(), "appended block");
        Ok(Block::from_record(hash, record))
    }

    /// The newest block.
    pub fn head(&self) -> LedgerResult<Block> {
        match self.snapshot()?.block_ref {
            Some(hash) => Block::read(&self.store, &hash),
            None => Err(LedgerError::EmptyChain),
        }
    }

    /// The block before `block`.
    pub fn previous(&self, block: &Block) -> LedgerResult<Block> {
        match block.previous_block {
            Some(hash) => Block::read(&self.store, &hash),
            None => Err(LedgerError::NoPreviousBlock),
        }
    }

    /// Every block from the head back to genesis.
    pub fn walk(&self) -> LedgerResult<Walk<'_, S>> {
        Ok(Walk::from_block(&self.store, self.snapshot()?.block_ref))
    }

    /// Re-read up to `limit` blocks from the head and check the chain's
    /// invariants.
    pub fn verify(&self, limit: Option<usize>) -> LedgerResult<ChainReport> {
        ChainVerifier::verify(&self.store, self.snapshot()?, limit)
    }
}

impl<S, H> std::fmt::Debug for BlockChain<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockChain")
            .field("exclusion", &self.exclusion)
            .finish_non_exhaustive()
    }
}

/// Lazy walk from a block back to genesis, produced by [`BlockChain::walk`].
pub struct Walk<'a, S: ?Sized> {
    store: &'a S,
    next: Option<Ref>,
}

impl<'a, S: Store + ?Sized> Walk<'a, S> {
    /// Walk backward starting at `from`.
    pub fn from_block(store: &'a S, from: Option<Ref>) -> Self {
        Self { store, next: from }
    }
}

impl<S: Store + ?Sized> Iterator for Walk<'_, S> {
    type Item = LedgerResult<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match Block::read(self.store, &hash) {
            Ok(block) => {
                self.next = block.previous_block;
                Some(Ok(block))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
