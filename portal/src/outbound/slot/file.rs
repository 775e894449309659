//! Directory-backed durable slot.
//!
//! Each key maps to `<key>.json` inside a capability-scoped directory.
//! Writes go to a uniquely named temporary file that is then renamed over
//! the target, so readers never observe a partially written value.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{DurableSlot, SlotError};

/// Slot persisting values as files in one directory.
#[derive(Debug)]
pub struct FileSlot {
    dir: Dir,
    root: PathBuf,
}

impl FileSlot {
    /// Open (creating if needed) the directory at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SlotError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(|error| {
            SlotError::write(format!("failed to create {}: {error}", root.display()))
        })?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|error| {
            SlotError::read(format!("failed to open {}: {error}", root.display()))
        })?;
        Ok(Self {
            dir,
            root: root.to_path_buf(),
        })
    }

    /// Directory backing the slot.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn file_name(key: &str) -> Option<String> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        valid.then(|| format!("{key}.json"))
    }
}

impl DurableSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let name = Self::file_name(key)
            .ok_or_else(|| SlotError::read(format!("invalid slot key {key:?}")))?;
        match self.dir.read_to_string(&name) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SlotError::read(format!("{name}: {error}"))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let name = Self::file_name(key)
            .ok_or_else(|| SlotError::write(format!("invalid slot key {key:?}")))?;
        let staging = format!(".{name}.{}.tmp", Uuid::new_v4().simple());
        self.dir
            .write(&staging, value)
            .map_err(|error| SlotError::write(format!("{staging}: {error}")))?;
        self.dir.rename(&staging, &self.dir, &name).map_err(|error| {
            if let Err(cleanup) = self.dir.remove_file(&staging) {
                warn!(
                    root = %self.root.display(),
                    %staging,
                    error = %cleanup,
                    "failed to remove staging file"
                );
            }
            SlotError::write(format!("{name}: {error}"))
        })
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        let name = Self::file_name(key)
            .ok_or_else(|| SlotError::write(format!("invalid slot key {key:?}")))?;
        match self.dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SlotError::write(format!("{name}: {error}"))),
        }
    }
}
