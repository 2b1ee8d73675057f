use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use vellum_blob::{verify_blob, write_blob, BlobReader};
use vellum_chunk::ChunkerConfig;
use vellum_index::{Entries, EntryQuery, InMemoryIndex, Index, Query};
use vellum_ledger::{read_latest, write_version, Block, BlockChain, ChainReport, Content};
use vellum_refs::{FileHeadStore, HeadStore, InMemoryHeadStore};
use vellum_store::{DiskStore, InMemoryStore, Store};
use vellum_types::{Fields, Ref};

use crate::config::VellumConfig;
use crate::error::{SdkError, SdkResult};
use crate::request::WriteRequest;

/// The chain type a [`Vellum`] instance owns.
pub type Chain = BlockChain<Arc<dyn Store>, Arc<dyn HeadStore>>;

/// High-level Vellum API.
///
/// Owns the store, the index and the single block chain of one instance.
/// All methods take `&self`; the type is safe to share behind an `Arc`.
///
/// Payloads are chunked concurrently. Linking a version to its
/// predecessor, appending its block and indexing it happen under one write
/// lock, so the index learns versions in chain order.
pub struct Vellum {
    store: Arc<dyn Store>,
    index: Arc<dyn Index>,
    chain: Chain,
    chunker: ChunkerConfig,
    write_lock: Mutex<()>,
}

impl Vellum {
    pub fn new(
        store: Arc<dyn Store>,
        index: Arc<dyn Index>,
        heads: Arc<dyn HeadStore>,
        chunker: ChunkerConfig,
    ) -> Self {
        Self {
            chain: BlockChain::new(Arc::clone(&store), heads),
            store,
            index,
            chunker,
            write_lock: Mutex::new(()),
        }
    }

    /// A fresh instance that keeps everything in memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryIndex::new()),
            Arc::new(InMemoryHeadStore::new()),
            ChunkerConfig::default(),
        )
    }

    /// Open the on-disk instance described by `config`.
    ///
    /// The index is held in memory and rebuilt from the chain on open.
    pub fn open(config: &VellumConfig) -> SdkResult<Self> {
        config.chunker.validate()?;
        let vellum = Self::new(
            Arc::new(DiskStore::open(&config.store_path)?),
            Arc::new(InMemoryIndex::new()),
            Arc::new(FileHeadStore::open(&config.head_path)?),
            config.chunker,
        );
        let indexed = vellum.reindex()?;
        info!(store = %config.store_path.display(), indexed, "opened vellum");
        Ok(vellum)
    }

    // ---- Writes ----

    /// Store a new version of `id` with the payload read from `reader`.
    pub fn write<R: Read>(&self, id: &str, reader: R, fields: Fields) -> SdkResult<Content> {
        self.write_request(WriteRequest::new(id, reader).with_fields(fields))
    }

    /// Store a new version as described by `request`.
    ///
    /// The payload is chunked and stored, then the content version, then a
    /// block is appended. Indexing comes last: if it fails, the write is
    /// still durable and [`SdkError::IndexLag`] carries the stored content.
    ///
    /// Without an explicit `previous_content`, the version replaces whatever
    /// the index holds as latest once the write lock is taken, not when the
    /// payload started streaming.
    pub fn write_request<R: Read>(&self, request: WriteRequest<R>) -> SdkResult<Content> {
        let WriteRequest {
            id,
            reader,
            fields,
            previous_content,
            ignore_duplicate_blob,
        } = request;

        let explicit = previous_content
            .map(|hash| Content::read(&*self.store, &hash))
            .transpose()?;
        let chunker = match &explicit {
            Some(previous) => self.chunker_for(Some(previous))?,
            None => self.chunker_for(read_latest(&*self.store, &*self.index, &id)?.as_ref())?,
        };
        let blob = write_blob(&*self.store, reader, chunker)?.blob_ref;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = match explicit {
            Some(previous) => Some(previous),
            None => read_latest(&*self.store, &*self.index, &id)?,
        };
        if let Some(previous) = previous.as_ref() {
            if ignore_duplicate_blob && previous.blob == blob {
                debug!(id = %id, content = %previous.hash.short(), "payload unchanged, skipping write");
                return Ok(previous.clone());
            }
        }

        let content = write_version(
            &*self.store,
            &id,
            fields,
            blob,
            previous.map(|p| p.hash),
        )?;
        let block = self.chain.append(content.hash)?;
        debug!(id = %id, block = block.number, content = %content.hash.short(), "wrote version");

        if let Err(source) = self.index.version(&content.hash, &content.record()) {
            warn!(id = %id, content = %content.hash, error = %source, "content stored but not indexed");
            return Err(SdkError::IndexLag {
                content: Box::new(content),
                source,
            });
        }
        Ok(content)
    }

    /// New versions are chunked like the version they replace, so unchanged
    /// regions produce the same chunks.
    fn chunker_for(&self, previous: Option<&Content>) -> SdkResult<ChunkerConfig> {
        let Some(previous) = previous else {
            return Ok(self.chunker);
        };
        let average = previous.blob_node(&*self.store)?.average_chunk_size as usize;
        if average == 0 || average == self.chunker.average_size {
            return Ok(self.chunker);
        }
        Ok(ChunkerConfig::with_average(average)?)
    }

    // ---- Reads ----

    /// The latest indexed version of `id`.
    pub fn read(&self, id: &str) -> SdkResult<Content> {
        read_latest(&*self.store, &*self.index, id)?.ok_or_else(|| SdkError::NotFound(id.into()))
    }

    /// The version stored under `hash`, whether or not it is indexed.
    pub fn read_hash(&self, hash: &Ref) -> SdkResult<Content> {
        Ok(Content::read(&*self.store, hash)?)
    }

    /// The exact bytes stored under `hash`.
    pub fn raw(&self, hash: &Ref) -> SdkResult<Vec<u8>> {
        Ok(self.store.read(hash)?)
    }

    /// Stream a version's payload.
    pub fn open_payload(&self, content: &Content) -> SdkResult<BlobReader<'_, dyn Store>> {
        Ok(content.open(&*self.store)?)
    }

    /// Read a version's whole payload into memory.
    pub fn payload(&self, content: &Content) -> SdkResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.open_payload(content)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Every older version of `content`, newest first.
    pub fn history(&self, content: &Content) -> SdkResult<Vec<Content>> {
        Ok(content
            .history(&*self.store)
            .collect::<Result<Vec<_>, _>>()?)
    }

    // ---- Index ----

    /// Versions matching `query`, newest first.
    pub fn search(&self, query: &Query) -> SdkResult<Vec<Content>> {
        self.index
            .search(query)?
            .iter()
            .map(|hash| self.read_hash(hash))
            .collect()
    }

    /// A page of the index's entry log.
    pub fn query(&self, query: &EntryQuery) -> SdkResult<Entries> {
        Ok(self.index.query(query)?)
    }

    /// Feed every version on the chain to the index, oldest first.
    ///
    /// Versions the index already knows are skipped by the index itself.
    /// Returns the number of blocks walked.
    pub fn reindex(&self) -> SdkResult<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut contents = self
            .chain
            .walk()?
            .map(|block| block.map(|b| b.content))
            .collect::<Result<Vec<_>, _>>()?;
        contents.reverse();
        for hash in &contents {
            let content = self.read_hash(hash)?;
            self.index.version(hash, &content.record())?;
        }
        debug!(blocks = contents.len(), "reindexed chain");
        Ok(contents.len())
    }

    // ---- Chain ----

    pub fn blockchain(&self) -> &Chain {
        &self.chain
    }

    /// Up to `limit` blocks, newest first.
    pub fn blocks(&self, limit: usize) -> SdkResult<Vec<Block>> {
        Ok(self
            .chain
            .walk()?
            .take(limit)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub fn verify(&self, limit: Option<usize>) -> SdkResult<ChainReport> {
        Ok(self.chain.verify(limit)?)
    }

    /// Re-read a version's whole payload and check its size and checksum.
    pub fn verify_payload(&self, content: &Content) -> SdkResult<()> {
        verify_blob(&*self.store, &content.blob)?;
        Ok(())
    }

    // ---- Accessors ----

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn index(&self) -> &Arc<dyn Index> {
        &self.index
    }

    pub fn chunker(&self) -> &ChunkerConfig {
        &self.chunker
    }
}
