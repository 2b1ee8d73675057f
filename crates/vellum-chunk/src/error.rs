use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunker config: {0}")]
    InvalidConfig(String),

    #[error("read failed at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

pub type ChunkResult<T> = Result<T, ChunkError>;
