use crate::error::Result;

/// Abstract interface for the raw key-value slot.
///
/// Values are opaque strings; serialization is the caller's business.
pub trait StorageBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing was ever written there.
    /// Returns Err only on actual I/O errors.
    fn read_slot(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    /// MUST be atomic to avoid leaving a half-written collection behind.
    fn write_slot(&self, key: &str, value: &str) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        (**self).write_slot(key, value)
    }
}
