use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;
use vellum_store::ContentRecord;
use vellum_types::{Fields, Ref};

use crate::error::{IndexError, IndexResult};
use crate::query::{Constraint, Node, Operator, Query, Value};
use crate::traits::{Entries, EntryQuery, Index};

/// In-memory [`Index`] for tests and embedding.
///
/// Versions are kept in the order they were indexed. Searches walk them
/// newest first, so results are stable for an unmodified index. Each
/// instance gets a fresh UUID v7 as its index version; entry numbers from
/// one instance mean nothing to another.
pub struct InMemoryIndex {
    index_version: String,
    state: RwLock<IndexState>,
}

#[derive(Default)]
struct IndexState {
    entries: Vec<IndexedVersion>,
    known: HashSet<Ref>,
    latest: HashMap<String, Ref>,
}

struct IndexedVersion {
    content_ref: Ref,
    id: String,
    fields: Fields,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            index_version: Uuid::now_v7().to_string(),
            state: RwLock::new(IndexState::default()),
        }
    }

    pub fn index_version(&self) -> &str {
        &self.index_version
    }

    /// Number of indexed versions.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIndex")
            .field("index_version", &self.index_version)
            .field("entries", &self.len())
            .finish()
    }
}

impl Index for InMemoryIndex {
    fn version(&self, content_ref: &Ref, content: &ContentRecord) -> IndexResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        if !state.known.insert(*content_ref) {
            return Ok(());
        }
        state.entries.push(IndexedVersion {
            content_ref: *content_ref,
            id: content.id.clone(),
            fields: content.fields.clone(),
        });
        state.latest.insert(content.id.clone(), *content_ref);
        debug!(
            id = %content.id,
            content = %content_ref.short(),
            entry = state.entries.len(),
            "indexed version"
        );
        Ok(())
    }

    fn latest(&self, id: &str) -> IndexResult<Option<Ref>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.latest.get(id).copied())
    }

    fn search(&self, query: &Query) -> IndexResult<Vec<Ref>> {
        let state = self.state.read().expect("lock poisoned");
        let matches = state
            .entries
            .iter()
            .rev()
            .filter(|v| query.root.as_ref().map_or(true, |node| node.matches(v)))
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|v| v.content_ref)
            .collect();
        Ok(matches)
    }

    fn query(&self, query: &EntryQuery) -> IndexResult<Entries> {
        if let Some(requested) = &query.index_version {
            if *requested != self.index_version {
                return Err(IndexError::IndexVersionMismatch {
                    requested: requested.clone(),
                    current: self.index_version.clone(),
                });
            }
        }
        if query.limit == 0 {
            return Err(IndexError::NoResults);
        }

        let state = self.state.read().expect("lock poisoned");
        let start = query.from_entry.max(1) as usize - 1;
        let refs: Vec<Ref> = state
            .entries
            .iter()
            .skip(start)
            .take(query.limit)
            .map(|v| v.content_ref)
            .collect();
        if refs.is_empty() {
            return Err(IndexError::NoResults);
        }
        Ok(Entries {
            index_version: self.index_version.clone(),
            refs,
        })
    }
}

impl Node {
    fn matches(&self, version: &IndexedVersion) -> bool {
        match self {
            Node::Constraint(c) => c.matches(version),
            Node::And(nodes) => nodes.iter().all(|n| n.matches(version)),
            Node::Or(nodes) => nodes.iter().any(|n| n.matches(version)),
        }
    }
}

impl Constraint {
    fn matches(&self, version: &IndexedVersion) -> bool {
        let expected = self.value.to_string();
        match &self.field {
            Some(field) => {
                let actual = version
                    .fields
                    .get(field)
                    .or_else(|| (field == "id").then_some(version.id.as_str()));
                match actual {
                    Some(actual) => compare(self.operator, actual, &expected, &self.value),
                    None => self.operator == Operator::NotEqual,
                }
            }
            None => match self.operator {
                Operator::Equal => {
                    let needle = expected.to_lowercase();
                    searchable_text(version).any(|text| text.to_lowercase().contains(&needle))
                }
                Operator::Fts => {
                    let haystack: Vec<String> =
                        searchable_text(version).map(str::to_lowercase).collect();
                    expected
                        .to_lowercase()
                        .split_whitespace()
                        .all(|term| haystack.iter().any(|text| text.contains(term)))
                }
                op => searchable_text(version).any(|text| compare(op, text, &expected, &self.value)),
            },
        }
    }
}

fn searchable_text(version: &IndexedVersion) -> impl Iterator<Item = &str> {
    std::iter::once(version.id.as_str()).chain(version.fields.iter().map(|(_, v)| v))
}

fn compare(operator: Operator, actual: &str, expected: &str, value: &Value) -> bool {
    let ordering = match (actual.trim().parse::<f64>().ok(), value.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(actual.cmp(expected)),
    };
    match operator {
        Operator::Equal => ordering == Some(Ordering::Equal),
        Operator::NotEqual => ordering != Some(Ordering::Equal),
        Operator::GreaterThan => ordering == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
        Operator::LessThan => ordering == Some(Ordering::Less),
        Operator::LessThanOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        Operator::Fts => {
            let actual = actual.to_lowercase();
            expected
                .to_lowercase()
                .split_whitespace()
                .all(|term| actual.contains(term))
        }
    }
}

#[cfg(test)]
mod tests {
    use vellum_crypto::Hasher;

    use super::*;
    use crate::query::{eq, fts, gt, lte, ne, text};

    fn record(id: &str, fields: &[(&str, &str)]) -> (Ref, ContentRecord) {
        let content = ContentRecord {
            id: id.to_string(),
            previous_content: None,
            blob: Hasher::BLAKE3.hash(b"blob"),
            fields: fields.iter().copied().collect(),
        };
        let id = Hasher::BLAKE3.hash(format!("{content:?}").as_bytes());
        (id, content)
    }

    fn indexed(records: &[(Ref, ContentRecord)]) -> InMemoryIndex {
        let index = InMemoryIndex::new();
        for (id, content) in records {
            index.version(id, content).unwrap();
        }
        index
    }

    #[test]
    fn doc1_is_found_by_its_field() {
        let (doc1, content) = record("doc1", &[("field", "foo")]);
        let index = indexed(&[(doc1, content)]);
        let hits = index.search(&Query::new().constraint(eq("field", "foo"))).unwrap();
        assert_eq!(hits, vec![doc1]);
    }

    #[test]
    fn search_is_newest_first_and_includes_every_version() {
        let records = vec![
            record("a", &[("kind", "note"), ("rev", "1")]),
            record("a", &[("kind", "note"), ("rev", "2")]),
            record("b", &[("kind", "note")]),
        ];
        let index = indexed(&records);
        let hits = index.search(&Query::new().constraint(eq("kind", "note"))).unwrap();
        assert_eq!(hits, vec![records[2].0, records[1].0, records[0].0]);
        assert_eq!(index.latest("a").unwrap(), Some(records[1].0));
        assert_eq!(index.latest("zzz").unwrap(), None);
    }

    #[test]
    fn pagination_partitions_stably() {
        let records: Vec<_> = (0..5)
            .map(|i| record(&format!("doc{i}"), &[("group", "g")]))
            .collect();
        let index = indexed(&records);
        let base = Query::new().constraint(eq("group", "g"));

        let first = index.search(&base.clone().limit(2)).unwrap();
        let second = index.search(&base.clone().limit(2).skip(2)).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|r| !second.contains(r)));

        for _ in 0..3 {
            assert_eq!(index.search(&base.clone().limit(2)).unwrap(), first);
            assert_eq!(index.search(&base.clone().limit(2).skip(2)).unwrap(), second);
        }
    }

    #[test]
    fn numeric_fields_compare_as_numbers() {
        let records = vec![
            record("a", &[("rank", "9")]),
            record("b", &[("rank", "10")]),
        ];
        let index = indexed(&records);
        assert_eq!(
            index.search(&Query::new().constraint(gt("rank", 9i64))).unwrap(),
            vec![records[1].0]
        );
        assert_eq!(
            index.search(&Query::new().constraint(lte("rank", "9"))).unwrap(),
            vec![records[0].0]
        );
    }

    #[test]
    fn fieldless_text_matches_any_field_or_id_case_insensitively() {
        let records = vec![
            record("report-2024", &[("title", "Quarterly Numbers")]),
            record("memo", &[("title", "lunch")]),
        ];
        let index = indexed(&records);
        assert_eq!(
            index.search(&Query::new().constraint(text("quarterly"))).unwrap(),
            vec![records[0].0]
        );
        assert_eq!(
            index.search(&Query::new().constraint(text("MEMO"))).unwrap(),
            vec![records[1].0]
        );
    }

    #[test]
    fn fts_requires_every_term() {
        let records = vec![
            record("a", &[("body", "the quick brown fox")]),
            record("b", &[("body", "the lazy dog")]),
        ];
        let index = indexed(&records);
        let hits = index.search(&Query::new().constraint(fts("body", "Fox quick"))).unwrap();
        assert_eq!(hits, vec![records[0].0]);
    }

    #[test]
    fn or_and_ne_combine() {
        let records = vec![
            record("a", &[("color", "red")]),
            record("b", &[("color", "blue")]),
            record("c", &[("shape", "round")]),
        ];
        let index = indexed(&records);
        let q = Query::new().or([eq("color", "red"), eq("shape", "round")]);
        assert_eq!(index.search(&q).unwrap(), vec![records[2].0, records[0].0]);

        let q = Query::new().constraint(ne("color", "red"));
        assert_eq!(index.search(&q).unwrap(), vec![records[2].0, records[1].0]);
    }

    #[test]
    fn parsed_query_searches_like_built_one() {
        let records = vec![record("doc1", &[("field", "foo")]), record("doc2", &[("field", "bar")])];
        let index = indexed(&records);
        let parsed = Query::parse("field:foo doc1").unwrap();
        assert_eq!(index.search(&parsed).unwrap(), vec![records[0].0]);
    }

    #[test]
    fn parsed_free_text_widens_field_matches() {
        let records = vec![record("doc1", &[("field", "foo")]), record("doc2", &[("field", "bar")])];
        let index = indexed(&records);

        let parsed = Query::parse("field:foo unrelatedword").unwrap();
        assert_eq!(index.search(&parsed).unwrap(), vec![records[0].0]);

        let parsed = Query::parse("field:foo doc2").unwrap();
        assert_eq!(index.search(&parsed).unwrap(), vec![records[1].0, records[0].0]);
    }

    #[test]
    fn reindexing_a_version_is_a_no_op() {
        let (id, content) = record("a", &[]);
        let index = InMemoryIndex::new();
        index.version(&id, &content).unwrap();
        index.version(&id, &content).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn query_pages_entry_log_in_write_order() {
        let records: Vec<_> = (0..7).map(|i| record(&format!("d{i}"), &[])).collect();
        let index = indexed(&records);

        let page = index.query(&EntryQuery::default()).unwrap();
        assert_eq!(page.index_version, index.index_version());
        assert_eq!(page.refs, records[..5].iter().map(|r| r.0).collect::<Vec<_>>());

        let page = index
            .query(&EntryQuery {
                from_entry: 6,
                ..EntryQuery::default()
            })
            .unwrap();
        assert_eq!(page.refs, vec![records[5].0, records[6].0]);
    }

    #[test]
    fn query_reports_no_results_and_version_mismatch() {
        let index = indexed(&[record("a", &[])]);

        let past_end = EntryQuery {
            from_entry: 2,
            ..EntryQuery::default()
        };
        assert!(matches!(index.query(&past_end), Err(IndexError::NoResults)));

        let zero = EntryQuery {
            limit: 0,
            ..EntryQuery::default()
        };
        assert!(matches!(index.query(&zero), Err(IndexError::NoResults)));

        let other = EntryQuery {
            index_version: Some(InMemoryIndex::new().index_version().to_string()),
            ..EntryQuery::default()
        };
        assert!(matches!(
            index.query(&other),
            Err(IndexError::IndexVersionMismatch { .. })
        ));

        let same = EntryQuery {
            index_version: Some(index.index_version().to_string()),
            ..EntryQuery::default()
        };
        assert_eq!(index.query(&same).unwrap().refs.len(), 1);
    }

    #[test]
    fn empty_index_has_no_entries() {
        let index = InMemoryIndex::new();
        assert!(index.is_empty());
        assert!(matches!(
            index.query(&EntryQuery::default()),
            Err(IndexError::NoResults)
        ));
    }
}
