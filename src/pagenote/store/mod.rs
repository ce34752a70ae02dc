//! # Storage Layer
//!
//! Pages live in memory inside a [`PageStore`] and are mirrored to a single
//! key-value slot through a [`StorageBackend`].
//!
//! ## Split of Concerns
//!
//! - [`StorageBackend`] handles the "how": reading and writing one string
//!   under one key. It knows nothing about pages.
//! - [`PageStore`] handles the "what": the ordered page collection, the
//!   selection, normalization of loaded records and the persistence rules.
//!
//! ## Persistence Rules
//!
//! The whole collection is written after every mutation, on blur and on
//! unload. A write is skipped when the collection is empty, so a transient
//! empty state can never erase previously saved pages.
//!
//! Reads are forgiving: an unreadable or unparsable slot is logged and
//! treated as "no saved data". Writes are not: a failed write is returned to
//! the caller.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one JSON file per key, written atomically.
//! - [`mem_backend::MemBackend`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── pagenote-pages.json   # The persisted collection (JSON array)
//! └── config.json           # Configuration
//! ```
//!
//! Because the config file shares the directory, `config` is not a valid
//! storage key.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod page_store;

pub use backend::StorageBackend;
pub use page_store::{FlushReason, LoadState, PageStore};
