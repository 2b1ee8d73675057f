use serde::Serialize;
use tracing::debug;
use vellum_blob::BlobReader;
use vellum_index::Index;
use vellum_store::{ContentRecord, DataNode, RecordStore, Store};
use vellum_types::{Fields, Ref};

use crate::error::{LedgerError, LedgerResult};

/// One version of a logical record, as read back from the store.
///
/// `hash` and `index` are not part of the stored record. `hash` is the ref
/// the record was read from; `index` is the distance from the newest
/// version of the id (1 = newest) when known, and 0 otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<Ref>,
    pub blob: Ref,
    pub fields: Fields,
    pub hash: Ref,
    pub index: u64,
}

impl Content {
    fn from_record(hash: Ref, record: ContentRecord, index: u64) -> Self {
        Self {
            id: record.id,
            previous_content: record.previous_content,
            blob: record.blob,
            fields: record.fields,
            hash,
            index,
        }
    }

    /// Load the version stored under `hash`. Its index is unknown.
    pub fn read<S: Store + ?Sized>(store: &S, hash: &Ref) -> LedgerResult<Self> {
        let record = store.read_content(hash)?;
        Ok(Self::from_record(*hash, record, 0))
    }

    /// The stored form of this version.
    pub fn record(&self) -> ContentRecord {
        ContentRecord {
            id: self.id.clone(),
            previous_content: self.previous_content,
            blob: self.blob,
            fields: self.fields.clone(),
        }
    }

    /// The version this one replaced.
    pub fn previous<S: Store + ?Sized>(&self, store: &S) -> LedgerResult<Self> {
        let hash = self.previous_content.ok_or(LedgerError::NoPreviousVersion)?;
        let mut previous = Self::read(store, &hash)?;
        if self.index > 0 {
            previous.index = self.index + 1;
        }
        Ok(previous)
    }

    /// Every older version of this id, newest first.
    pub fn history<'a, S: Store + ?Sized>(&self, store: &'a S) -> History<'a, S> {
        History {
            store,
            next: self.previous_content,
            index: self.index,
        }
    }

    /// The Data node of this version's payload.
    pub fn blob_node<S: Store + ?Sized>(&self, store: &S) -> LedgerResult<DataNode> {
        Ok(store.read_data(&self.blob)?)
    }

    /// Stream this version's payload.
    pub fn open<'a, S: Store + ?Sized>(&self, store: &'a S) -> LedgerResult<BlobReader<'a, S>> {
        Ok(BlobReader::open(store, &self.blob)?)
    }
}

/// Lazy walk over older versions, produced by [`Content::history`].
pub struct History<'a, S: ?Sized> {
    store: &'a S,
    next: Option<Ref>,
    index: u64,
}

impl<S: Store + ?Sized> Iterator for History<'_, S> {
    type Item = LedgerResult<Content>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match Content::read(self.store, &hash) {
            Ok(mut content) => {
                if self.index > 0 {
                    self.index += 1;
                    content.index = self.index;
                }
                self.next = content.previous_content;
                Some(Ok(content))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Store one new version of `id`.
///
/// Existing records are never touched; `previous` only links the new
/// version to the one it replaces. The returned content is the newest
/// version of its history, so its index is 1.
pub fn write_version<S: Store + ?Sized>(
    store: &S,
    id: &str,
    fields: Fields,
    blob: Ref,
    previous: Option<Ref>,
) -> LedgerResult<Content> {
    let record = ContentRecord {
        id: id.to_string(),
        previous_content: previous,
        blob,
        fields,
    };
    let hash = store.write_record(record.clone())?;
    debug!(id, content = %hash.short(), "wrote content version");
    Ok(Content::from_record(hash, record, 1))
}

/// The newest indexed version of `id`, if the index knows of one.
pub fn read_latest<S, I>(store: &S, index: &I, id: &str) -> LedgerResult<Option<Content>>
where
    S: Store + ?Sized,
    I: Index + ?Sized,
{
    let Some(hash) = index.latest(id)? else {
        return Ok(None);
    };
    let mut content = Content::read(store, &hash)?;
    content.index = 1;
    Ok(Some(content))
}
