use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use vellum_types::Ref;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::{RefIter, Store};

/// Filesystem object store.
///
/// Each object lives in its own file named by its ref, fanned out into
/// subdirectories by the first byte of the digest:
///
/// ```text
/// <root>/ab/blake3-ab12...
/// ```
///
/// Writes go to a temporary file in the target directory and are renamed
/// into place, so a crash never leaves a partially written object under a
/// valid ref. Reads re-hash the bytes and report corruption.
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened disk store");
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &Ref) -> PathBuf {
        let digest = id.digest_hex();
        self.root.join(&digest[..2]).join(id.to_string())
    }
}

impl Store for DiskStore {
    fn exists(&self, id: &Ref) -> StoreResult<bool> {
        match fs::metadata(self.object_path(id)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self, id: &Ref) -> StoreResult<Vec<u8>> {
        let data = match fs::read(self.object_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };

        let actual = self.hasher().hash(&data);
        if actual != *id {
            return Err(StoreError::Corrupt { id: *id, actual });
        }
        Ok(data)
    }

    fn write(&self, data: &[u8]) -> StoreResult<Ref> {
        let id = self.hasher().hash(data);
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        sync_dir(dir)?;

        debug!(id = %id.short(), size = data.len(), "wrote object");
        Ok(id)
    }

    fn list(&self) -> StoreResult<RefIter<'_>> {
        let iter = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let name = entry.file_name().to_str()?;
                    // Temporary files from in-flight writes are not objects.
                    Ref::parse(name).ok().map(Ok)
                }
                Ok(_) => None,
                Err(e) => Some(Err(StoreError::Io(io::Error::other(e)))),
            });
        Ok(Box::new(iter))
    }

    fn open(&self, id: &Ref) -> StoreResult<Box<dyn Read + Send + '_>> {
        match File::open(self.object_path(id)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
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
