use serde::{Deserialize, Serialize};
use vellum_store::ContentRecord;
use vellum_types::Ref;

use crate::error::IndexResult;
use crate::query::Query;

/// Page size used when an [`EntryQuery`] does not name one.
pub const DEFAULT_ENTRY_LIMIT: usize = 5;

/// Cursor-style request over the index's entry log.
///
/// Entries are numbered from 1 in the order they were indexed.
/// `from_entry` names the first entry to return (0 is read as 1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EntryQuery {
    pub from_entry: u64,
    pub limit: usize,
    /// When set, the request fails unless it matches the index's version.
    pub index_version: Option<String>,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            from_entry: 0,
            limit: DEFAULT_ENTRY_LIMIT,
            index_version: None,
        }
    }
}

/// One page of the entry log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entries {
    /// Identity of the index instance that produced the page. Entry numbers
    /// are only meaningful against the same instance.
    pub index_version: String,
    pub refs: Vec<Ref>,
}

/// Searchable index over content versions.
///
/// The index is told about every version after it is durably stored. It
/// owns the id-to-latest-version mapping, which the ledger never derives
/// by scanning the chain.
pub trait Index: Send + Sync {
    /// Record one stored version, addressed by `content_ref`.
    fn version(&self, content_ref: &Ref, content: &ContentRecord) -> IndexResult<()>;

    /// Ref of the newest indexed version of `id`.
    fn latest(&self, id: &str) -> IndexResult<Option<Ref>>;

    /// Refs of matching versions, in a stable order, after applying skip
    /// and limit.
    fn search(&self, query: &Query) -> IndexResult<Vec<Ref>>;

    /// A page of the entry log.
    ///
    /// Fails with `IndexVersionMismatch` when `index_version` names another
    /// instance, and with `NoResults` when the limit is zero or the page is
    /// empty.
    fn query(&self, query: &EntryQuery) -> IndexResult<Entries>;
}

impl<I: Index + ?Sized> Index for std::sync::Arc<I> {
    fn version(&self, content_ref: &Ref, content: &ContentRecord) -> IndexResult<()> {
        (**self).version(content_ref, content)
    }

    fn latest(&self, id: &str) -> IndexResult<Option<Ref>> {
        (**self).latest(id)
    }

    fn search(&self, query: &Query) -> IndexResult<Vec<Ref>> {
        (**self).search(query)
    }

    fn query(&self, query: &EntryQuery) -> IndexResult<Entries> {
        (**self).query(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_query_defaults_to_five() {
        let q: EntryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q, EntryQuery::default());
        assert_eq!(q.limit, DEFAULT_ENTRY_LIMIT);
    }

    #[test]
    fn entry_query_uses_camel_case_names() {
        let q: EntryQuery =
            serde_json::from_str(r#"{"fromEntry": 3, "limit": 2, "indexVersion": "v"}"#).unwrap();
        assert_eq!(q.from_entry, 3);
        assert_eq!(q.limit, 2);
        assert_eq!(q.index_version.as_deref(), Some("v"));
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        assert!(serde_json::from_str::<EntryQuery>(r#"{"offset": 1}"#).is_err());
    }
}
