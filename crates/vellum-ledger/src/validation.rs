use vellum_store::{Record, Store};
use vellum_types::Ref;

use crate::chain::ChainHead;
use crate::error::{LedgerError, LedgerResult};

/// Result of re-reading the chain from its head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainReport {
    pub head: ChainHead,
    /// Blocks that were read, whether or not they passed.
    pub blocks: u64,
    pub violations: Vec<Violation>,
}

impl ChainReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn the first violation into an error.
    pub fn into_result(self) -> LedgerResult<Self> {
        match self.violations.first() {
            Some(v) => Err(LedgerError::IntegrityViolation {
                number: v.number,
                reason: v.description.clone(),
            }),
            None => Ok(self),
        }
    }
}

/// A specific integrity violation found while walking the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Block number the walk expected at this position.
    pub number: u64,
    pub block: Ref,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    NumberGap,
    BrokenLink,
    HashMismatch,
    MissingContent,
    Unreadable,
}

/// Chain integrity checker.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Walk back from `head`, checking at most `limit` blocks.
    ///
    /// Numbers must count down by one to a genesis block #1 that has no
    /// previous block, each block must re-encode to its own ref, and every
    /// referenced content version must be present. A block that cannot be
    /// read ends the walk.
    pub fn verify<S: Store + ?Sized>(
        store: &S,
        head: ChainHead,
        limit: Option<usize>,
    ) -> LedgerResult<ChainReport> {
        let hasher = store.hasher();
        let limit = limit.unwrap_or(usize::MAX);
        let mut violations = Vec::new();
        let mut blocks = 0u64;
        let mut expected = head.number;
        let mut next = head.block_ref;

        while let Some(hash) = next.take() {
            if blocks as usize >= limit {
                break;
            }
            let mut violation = |kind, description: String| {
                violations.push(Violation {
                    number: expected,
                    block: hash,
                    kind,
                    description,
                })
            };

            let bytes = match store.read(&hash) {
                Ok(bytes) => bytes,
                Err(vellum_store::StoreError::NotFound(_)) => {
                    violation(ViolationKind::BrokenLink, format!("block {hash} is missing"));
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            let record = match Record::decode(&hash, &bytes) {
                Ok(Record::Block(record)) => record,
                Ok(other) => {
                    violation(
                        ViolationKind::Unreadable,
                        format!("{hash} holds a {} record", other.schema_type()),
                    );
                    break;
                }
                Err(e) => {
                    violation(ViolationKind::Unreadable, e.to_string());
                    break;
                }
            };
            blocks += 1;

            let computed = hasher.hash(&Record::Block(record.clone()).encode()?);
            if computed != hash {
                violation(
                    ViolationKind::HashMismatch,
                    format!("block re-encodes to {computed}"),
                );
            }
            if record.number != expected {
                violation(
                    ViolationKind::NumberGap,
                    format!("expected block #{expected}, found #{}", record.number),
                );
            }
            match (record.number, record.previous_block) {
                (1, Some(_)) => violation(
                    ViolationKind::BrokenLink,
                    "genesis block links to a previous block".into(),
                ),
                (n, None) if n != 1 => violation(
                    ViolationKind::BrokenLink,
                    format!("block #{n} has no previous block"),
                ),
                _ => {}
            }
            if !store.exists(&record.content)? {
                violation(
                    ViolationKind::MissingContent,
                    format!("content {} is missing", record.content),
                );
            }

            expected = record.number.saturating_sub(1);
            next = record.previous_block;
        }

        Ok(ChainReport {
            head,
            blocks,
            violations,
        })
    }
}
