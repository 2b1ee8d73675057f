use std::collections::HashSet;

use tracing::debug;
use vellum_store::{DataNode, PartsNode, RecordStore, Store, PAGE_SIZE};
use vellum_types::Ref;

use crate::error::{BlobError, BlobResult};
use crate::writer::ChunkSummary;

/// Result of [`assemble`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembled {
    /// Ref of the terminal Data node: the blob handle.
    pub blob_ref: Ref,
    /// Every ref written, oldest first. The Data node is last.
    pub written: Vec<Ref>,
}

/// Build the reference tree for an ordered list of chunk refs.
///
/// With `n` refs there are `max(1, ceil(n / PAGE_SIZE))` pages. All but the
/// last are full and written oldest first as Parts pages, each linking to
/// the page written before it. The last page, which is the only one that
/// may be partial, is embedded in the Data node, which links to the newest
/// Parts page. Small payloads therefore need no indirection at all.
pub fn assemble<S: Store + ?Sized>(store: &S, summary: &ChunkSummary) -> BlobResult<Assembled> {
    let refs = &summary.refs;
    let page_count = refs.len().div_ceil(PAGE_SIZE).max(1);
    let tail_start = (page_count - 1) * PAGE_SIZE;

    let mut written = Vec::with_capacity(page_count);
    let mut more_parts = None;
    for page in refs[..tail_start].chunks(PAGE_SIZE) {
        let id = store.write_record(PartsNode {
            parts: page.to_vec(),
            more_parts,
        })?;
        debug!(page = %id.short(), parts = page.len(), "wrote parts page");
        written.push(id);
        more_parts = Some(id);
    }

    let blob_ref = store.write_record(DataNode {
        parts: refs[tail_start..].to_vec(),
        more_parts,
        size: summary.size,
        checksum: summary.checksum.clone(),
        average_chunk_size: summary.average_chunk_size,
    })?;
    written.push(blob_ref);

    debug!(
        blob = %blob_ref.short(),
        chunks = refs.len(),
        pages = page_count,
        "assembled blob"
    );
    Ok(Assembled { blob_ref, written })
}

/// Recover the ordered chunk refs of a blob.
///
/// Starts at the Data node and follows `more_parts` backward, prepending
/// each page. A page with more than `PAGE_SIZE` refs, or a link back to a
/// node already visited, is reported as corruption.
pub fn read_refs<S: Store + ?Sized>(store: &S, blob_ref: &Ref) -> BlobResult<Vec<Ref>> {
    let data = store.read_data(blob_ref)?;
    collect_refs(store, blob_ref, data)
}

pub(crate) fn collect_refs<S: Store + ?Sized>(
    store: &S,
    blob_ref: &Ref,
    data: DataNode,
) -> BlobResult<Vec<Ref>> {
    check_page(blob_ref, data.parts.len())?;

    let mut visited = HashSet::from([*blob_ref]);
    let mut pages = vec![data.parts];
    let mut next = data.more_parts;

    while let Some(id) = next {
        if !visited.insert(id) {
            return Err(BlobError::Cycle(id));
        }
        let page = store.read_parts(&id)?;
        check_page(&id, page.parts.len())?;
        pages.push(page.parts);
        next = page.more_parts;
    }

    Ok(pages.into_iter().rev().flatten().collect())
}

fn check_page(id: &Ref, count: usize) -> BlobResult<()> {
    if count > PAGE_SIZE {
        return Err(BlobError::OversizedPage { id: *id, count });
    }
    Ok(())
}
