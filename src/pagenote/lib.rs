//! # Pagenote Architecture
//!
//! Pagenote is a small page-based note keeper: an ordered collection of
//! titled pages, each holding a sequence of editor blocks, mirrored as one
//! JSON document into a single storage slot. The library is UI-agnostic; the
//! `pagenote` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders the sidebar, runs the shell    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the page store and the editor adapter               │
//! │  - Keeps the mounted editor on the selected page            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Resolves selectors, builds structured results            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store/) + Editor (editor/)                          │
//! │  - PageStore: collection, selection, load lifecycle         │
//! │  - StorageBackend: FsBackend (production), MemBackend       │
//! │  - EditorAdapter: surface mount/unmount, change forwarding  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code returns `Result<CmdResult>` and never writes
//! to stdout or assumes a terminal. Launching `$EDITOR` lives in
//! [`editor::external`] and is only called by the CLI.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per user-facing operation
//! - [`store`]: Page store and storage backends
//! - [`editor`]: Editing surfaces and the adapter that feeds the store
//! - [`model`]: `Page`, `PageId`, `Block` and load-time normalization
//! - [`index`]: Positional display indexes and selector resolution
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod index;
pub mod model;
pub mod store;
