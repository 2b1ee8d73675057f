use serde::{Deserialize, Serialize};
use vellum_types::Ref;

/// Pointer to the newest block of the chain.
///
/// A snapshot value: readers copy it out and the chain replaces it whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Head {
    /// Ref of the newest block.
    pub block_ref: Ref,
    /// Number of the newest block; genesis is 1.
    pub number: u64,
}

impl Head {
    pub fn new(block_ref: Ref, number: u64) -> Self {
        Self { block_ref, number }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.number, self.block_ref)
    }
}
