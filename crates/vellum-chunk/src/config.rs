use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, ChunkResult};

/// Size parameters for a [`Roller`](crate::Roller).
///
/// Chunk boundaries are drawn with probability `1 / next_power_of_two(average)`
/// per byte, then clamped: no chunk is shorter than `min_size` unless the
/// stream ends, and none is longer than `max_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Target average chunk size in bytes.
    pub average_size: usize,
    /// Smallest chunk the roller will cut, except for the final one.
    pub min_size: usize,
    /// Chunks are always cut at this size.
    pub max_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            average_size: 64 * 1024,
            min_size: 16 * 1024,
            max_size: 256 * 1024,
        }
    }
}

impl ChunkerConfig {
    /// Build a validated config.
    pub fn new(average_size: usize, min_size: usize, max_size: usize) -> ChunkResult<Self> {
        let config = Self {
            average_size,
            min_size,
            max_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// A config targeting `average_size`, with min and max at a quarter and
    /// four times the average, like the defaults.
    pub fn with_average(average_size: usize) -> ChunkResult<Self> {
        Self::new(
            average_size,
            (average_size / 4).max(1),
            average_size.saturating_mul(4),
        )
    }

    /// Check `0 < min_size <= average_size <= max_size`.
    pub fn validate(&self) -> ChunkResult<()> {
        if self.min_size == 0 {
            return Err(ChunkError::InvalidConfig("min_size must be positive".into()));
        }
        if self.min_size > self.average_size {
            return Err(ChunkError::InvalidConfig(format!(
                "min_size {} exceeds average_size {}",
                self.min_size, self.average_size
            )));
        }
        if self.average_size > self.max_size {
            return Err(ChunkError::InvalidConfig(format!(
                "average_size {} exceeds max_size {}",
                self.average_size, self.max_size
            )));
        }
        Ok(())
    }

    /// Bit mask the rolling checksum must match to declare a boundary.
    pub fn mask(&self) -> u32 {
        let bits = self.average_size.max(1).next_power_of_two() as u64;
        (bits.min(1 << 31) - 1) as u32
    }
}
