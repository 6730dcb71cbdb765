//! File-backed program store with per-program locking.
//!
//! Layout under the store root:
//!
//! ```text
//! programs/<program-id>.json   committed record
//! programs/<program-id>.lock   writer lock (fs2 exclusive lock)
//! ```
//!
//! Writers take the program's lock file exclusively for the whole
//! transaction and commit by writing a temp file in the same directory and
//! renaming it over the record. Readers never lock: a rename is atomic, so a
//! reader sees either the previous or the new committed record.

use crate::store::{ProgramRecord, ProgramStore};
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join("programs");
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Opened program store at {:?}", dir);
        Ok(Self { dir })
    }

    fn record_path(&self, program_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", program_id))
    }

    fn lock_path(&self, program_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.lock", program_id))
    }

    /// Take the writer lock for one program; released when the file is dropped
    fn lock(&self, program_id: Uuid) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(program_id))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    /// Release a writer lock after its commit; the commit stands either way
    fn release(lock: File, program_id: Uuid) {
        if let Err(e) = lock.unlock() {
            tracing::warn!("Failed to unlock program {}: {}", program_id, e);
        }
    }

    fn read_record(path: &Path) -> Result<ProgramRecord> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Serialize a record into a synced temp file next to its final location
    fn write_temp(&self, record: &ProgramRecord) -> Result<NamedTempFile> {
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(record)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        Ok(temp)
    }
}

impl ProgramStore for FileStore {
    fn insert(&self, record: ProgramRecord) -> Result<()> {
        let program_id = record.program.id;
        let lock = self.lock(program_id)?;

        let temp = self.write_temp(&record)?;
        temp.persist_noclobber(self.record_path(program_id))
            .map_err(|e| match e.error.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    Error::Store(format!("program {} already exists", program_id))
                }
                _ => Error::Io(e.error),
            })?;

        Self::release(lock, program_id);
        tracing::debug!("Inserted program {} with {} days", program_id, record.days.len());
        Ok(())
    }

    fn load(&self, program_id: Uuid) -> Result<Option<ProgramRecord>> {
        let path = self.record_path(program_id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    fn load_all(&self) -> Result<Vec<ProgramRecord>> {
        let mut records = Vec::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable program record {:?}: {}", path, e);
                }
            }
        }

        tracing::debug!("Loaded {} program records", records.len());
        Ok(records)
    }

    fn locate_day(&self, day_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| record.day(day_id).is_some())
            .map(|record| record.program.id))
    }

    fn update<T, F>(&self, program_id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProgramRecord) -> Result<T>,
    {
        let path = self.record_path(program_id);
        if !path.exists() {
            return Err(Error::ProgramNotFound(program_id));
        }

        let lock = self.lock(program_id)?;

        // Re-read under the lock so we build on the latest commit
        let mut working = Self::read_record(&path)?;
        let value = f(&mut working)?;

        if working.program.id != program_id {
            return Err(Error::Store(format!(
                "transaction on {} changed the program id",
                program_id
            )));
        }

        let temp = self.write_temp(&working)?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        Self::release(lock, program_id);
        tracing::debug!("Committed transaction on program {}", program_id);
        Ok(value)
    }
}
