use super::backend::StorageBackend;
use crate::error::{PagenoteError, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Slot names already taken by other files in the data directory.
const RESERVED_SLOTS: &[&str] = &["config"];

/// Whether `key` would land on a file that is not a slot.
///
/// Compared case-insensitively, since the data directory may live on a
/// case-insensitive filesystem.
pub fn is_reserved_key(key: &str) -> bool {
    let name = sanitize_key(key);
    RESERVED_SLOTS
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
}

/// File-backed slots: each key is a `<key>.json` file under `root`.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if is_reserved_key(key) {
            return Err(PagenoteError::Store(format!(
                "Storage key '{}' is reserved",
                key
            )));
        }
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PagenoteError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        self.check_key(key)?;
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = fs::read_to_string(path).map_err(PagenoteError::Io)?;
        Ok(Some(value))
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.check_key(key)?;
        self.ensure_dir()?;
        let target = self.slot_path(key);

        // Atomic write
        let tmp = self.root.join(format!(".slot-{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value).and_then(|_| fs::rename(&tmp, &target)) {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!("Failed to remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(PagenoteError::Io(e));
        }
        Ok(())
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
