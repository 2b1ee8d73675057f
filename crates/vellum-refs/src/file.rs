//! Durable head store backed by a single file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::HeadStore;
use crate::types::Head;

const HEADER_SIZE: usize = 8;

/// Head store persisting the head to one file.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Head)]
/// ```
///
/// Every `set` writes a complete new file next to the old one and renames
/// it into place, so a crash leaves either the old head or the new one.
#[derive(Debug)]
pub struct FileHeadStore {
    path: PathBuf,
}

impl FileHeadStore {
    /// Use `path` as the head file. Parent directories are created; the file
    /// itself appears on the first `set`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> RefError {
        RefError::Corrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl HeadStore for FileHeadStore {
    fn get(&self) -> Result<Option<Head>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if bytes.len() < HEADER_SIZE {
            return Err(self.corrupt("truncated header"));
        }
        let length = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let expected_crc = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != length {
            return Err(self.corrupt(format!(
                "payload is {} bytes, header says {length}",
                payload.len()
            )));
        }
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(self.corrupt(format!(
                "crc mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"
            )));
        }

        let head = bincode::deserialize(payload)
            .map_err(|e| RefError::Serialization(e.to_string()))?;
        Ok(Some(head))
    }

    fn set(&self, head: &Head) -> Result<()> {
        let payload =
            bincode::serialize(head).map_err(|e| RefError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&(payload.len() as u32).to_le_bytes())?;
        tmp.write_all(&crc32fast::hash(&payload).to_le_bytes())?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| RefError::Io(e.error))?;
        sync_dir(dir)?;

        debug!(number = head.number, block = %head.block_ref.short(), "head updated");
        Ok(())
    }
}

/// Flush a directory entry so a rename inside it survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
