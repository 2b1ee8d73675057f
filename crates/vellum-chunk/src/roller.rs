use std::io::{BufRead, BufReader, ErrorKind, Read};

use crate::config::ChunkerConfig;
use crate::error::{ChunkError, ChunkResult};
use crate::rollsum::Rollsum;

/// One contiguous piece of a payload.
///
/// The boundaries are byte offsets into the source stream. They are only
/// useful while chunking and are never persisted: the stored form of a
/// chunk is exactly its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub bytes: Vec<u8>,
    pub start_boundary: u64,
    pub end_boundary: u64,
}

impl Chunk {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Lazy content-defined splitter over a byte stream.
///
/// Yields chunks in stream order. Concatenating them reproduces the input
/// exactly. The sequence ends at end of stream, or after the first I/O
/// error, which is reported once with the offset it occurred at.
pub struct Roller<R> {
    reader: BufReader<R>,
    rollsum: Rollsum,
    config: ChunkerConfig,
    mask: u32,
    offset: u64,
    done: bool,
}

impl<R: Read> Roller<R> {
    /// Start chunking `reader` with a validated config.
    pub fn new(reader: R, config: ChunkerConfig) -> ChunkResult<Self> {
        config.validate()?;
        Ok(Self {
            reader: BufReader::with_capacity(config.max_size.clamp(8 * 1024, 1024 * 1024), reader),
            rollsum: Rollsum::new(),
            mask: config.mask(),
            config,
            offset: 0,
            done: false,
        })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Bytes consumed from the stream so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_chunk(&mut self) -> ChunkResult<Option<Chunk>> {
        let start = self.offset;
        let mut bytes = Vec::new();

        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ChunkError::Io {
                        offset: start + bytes.len() as u64,
                        source,
                    })
                }
            };
            if buf.is_empty() {
                break;
            }

            let mut consumed = buf.len();
            let mut cut = false;
            for (i, &byte) in buf.iter().enumerate() {
                self.rollsum.roll(byte);
                let len = bytes.len() + i + 1;
                if len >= self.config.max_size
                    || (len >= self.config.min_size && self.rollsum.on_split(self.mask))
                {
                    consumed = i + 1;
                    cut = true;
                    break;
                }
            }
            bytes.extend_from_slice(&buf[..consumed]);
            self.reader.consume(consumed);

            if cut {
                break;
            }
        }

        if bytes.is_empty() {
            return Ok(None);
        }
        self.offset = start + bytes.len() as u64;
        Ok(Some(Chunk {
            bytes,
            start_boundary: start,
            end_boundary: self.offset,
        }))
    }
}

impl<R: Read> Iterator for Roller<R> {
    type Item = ChunkResult<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> std::fmt::Debug for Roller<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roller")
            .field("config", &self.config)
            .field("offset", &self.offset)
            .field("done", &self.done)
            .finish()
    }
}
