//! Schema-tagged records persisted on top of the raw object store.
//!
//! Every structured object is a JSON document whose `"schema"` key names its
//! type. Field order is fixed by the struct definitions, optional fields are
//! omitted when absent, and maps are sorted, so equal values always encode
//! to equal bytes and therefore to equal refs.
//!
//! Raw chunk bytes are not records: a chunk is stored as exactly the bytes
//! it covers.

use serde::{Deserialize, Serialize};
use vellum_types::{Fields, Ref};

use crate::error::{StoreError, StoreResult};
use crate::traits::Store;

/// Maximum number of chunk refs held by a single Parts page or Data node.
pub const PAGE_SIZE: usize = 100;

/// The schema tag of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Parts,
    Data,
    Content,
    Block,
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parts => write!(f, "parts"),
            Self::Data => write!(f, "data"),
            Self::Content => write!(f, "content"),
            Self::Block => write!(f, "block"),
        }
    }
}

/// An intermediate page of chunk refs.
///
/// Pages form a singly linked list from newest to oldest through
/// `more_parts`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsNode {
    pub parts: Vec<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_parts: Option<Ref>,
}

/// The terminal, self-describing node of a blob.
///
/// Holds the newest page of chunk refs directly, plus the total payload
/// size and a checksum of the payload bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataNode {
    pub parts: Vec<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_parts: Option<Ref>,
    pub size: u64,
    pub checksum: String,
    /// Average chunk size the payload was split with, so later versions can
    /// be chunked the same way.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub average_chunk_size: u64,
}

/// One immutable version of a logical record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_content: Option<Ref>,
    pub blob: Ref,
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub fields: Fields,
}

/// One entry of the global block chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_block: Option<Ref>,
    pub content: Ref,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// A persisted structured object, keyed by its schema tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "lowercase")]
pub enum Record {
    Parts(PartsNode),
    Data(DataNode),
    Content(ContentRecord),
    Block(BlockRecord),
}

#[derive(Deserialize)]
struct Envelope {
    schema: String,
}

impl Record {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            Self::Parts(_) => SchemaType::Parts,
            Self::Data(_) => SchemaType::Data,
            Self::Content(_) => SchemaType::Content,
            Self::Block(_) => SchemaType::Block,
        }
    }

    /// Canonical encoding of this record.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode the bytes stored under `id`.
    ///
    /// The schema tag is read and checked first; only a known tag proceeds
    /// to the structural decode of its variant.
    pub fn decode(id: &Ref, bytes: &[u8]) -> StoreResult<Self> {
        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(|e| StoreError::InvalidRecord {
                id: *id,
                reason: format!("missing schema tag: {e}"),
            })?;
        if !matches!(
            envelope.schema.as_str(),
            "parts" | "data" | "content" | "block"
        ) {
            return Err(StoreError::InvalidRecord {
                id: *id,
                reason: format!("unknown schema type {:?}", envelope.schema),
            });
        }
        serde_json::from_slice(bytes).map_err(|e| StoreError::InvalidRecord {
            id: *id,
            reason: e.to_string(),
        })
    }

    fn unexpected(self, id: &Ref, expected: SchemaType) -> StoreError {
        StoreError::UnexpectedRecord {
            id: *id,
            expected: expected.to_string(),
            found: self.schema_type().to_string(),
        }
    }
}

impl From<PartsNode> for Record {
    fn from(node: PartsNode) -> Self {
        Self::Parts(node)
    }
}

impl From<DataNode> for Record {
    fn from(node: DataNode) -> Self {
        Self::Data(node)
    }
}

impl From<ContentRecord> for Record {
    fn from(record: ContentRecord) -> Self {
        Self::Content(record)
    }
}

impl From<BlockRecord> for Record {
    fn from(record: BlockRecord) -> Self {
        Self::Block(record)
    }
}

/// Record-level reads and writes on top of any [`Store`].
pub trait RecordStore: Store {
    /// Encode and write a record, returning its ref.
    fn write_record(&self, record: impl Into<Record>) -> StoreResult<Ref> {
        let bytes = record.into().encode()?;
        self.write(&bytes)
    }

    /// Read and decode the record stored under `id`.
    fn read_record(&self, id: &Ref) -> StoreResult<Record> {
        let bytes = self.read(id)?;
        Record::decode(id, &bytes)
    }

    fn read_parts(&self, id: &Ref) -> StoreResult<PartsNode> {
        match self.read_record(id)? {
            Record::Parts(node) => Ok(node),
            other => Err(other.unexpected(id, SchemaType::Parts)),
        }
    }

    fn read_data(&self, id: &Ref) -> StoreResult<DataNode> {
        match self.read_record(id)? {
            Record::Data(node) => Ok(node),
            other => Err(other.unexpected(id, SchemaType::Data)),
        }
    }

    fn read_content(&self, id: &Ref) -> StoreResult<ContentRecord> {
        match self.read_record(id)? {
            Record::Content(record) => Ok(record),
            other => Err(other.unexpected(id, SchemaType::Content)),
        }
    }

    fn read_block(&self, id: &Ref) -> StoreResult<BlockRecord> {
        match self.read_record(id)? {
            Record::Block(record) => Ok(record),
            other => Err(other.unexpected(id, SchemaType::Block)),
        }
    }
}

impl<S: Store + ?Sized> RecordStore for S {}
