//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for all pagenote operations, whatever the UI.
//!
//! It owns the two collaborating parts of a session:
//! - the [`PageStore`], sole owner of the page collection and its slot
//! - the [`EditorAdapter`], holding the open page's live content
//!
//! and keeps them in step: after anything that may move the selection the
//! editor is rebuilt for the newly selected page.
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs` and the store
//! - **I/O**: no stdout, no terminal, no launching editors
//!
//! ## Lifecycle
//!
//! [`PagenoteApi::open`] builds and loads a store; [`PagenoteApi::dispose`]
//! forwards any pending editor change and performs the unload flush.

use crate::commands;
use crate::editor::markdown::MarkdownSurface;
use crate::editor::EditorAdapter;
use crate::error::{PagenoteError, Result};
use crate::model::{Page, PageId};
use crate::store::{FlushReason, PageStore, StorageBackend};
use std::path::{Path, PathBuf};

pub use commands::config::ConfigAction;
pub use commands::edit::EditAction;
pub use commands::{CmdMessage, CmdResult, MessageLevel, PageView};

pub struct PagenoteApi<B: StorageBackend> {
    store: PageStore<B>,
    editor: EditorAdapter<MarkdownSurface>,
    config_dir: PathBuf,
}

impl<B: StorageBackend> PagenoteApi<B> {
    /// Loads the collection under `key` and opens the selected page.
    pub fn open(backend: B, key: &str, config_dir: PathBuf) -> Result<Self> {
        let mut store = PageStore::init(backend, key);
        store.load()?;
        let mut editor = EditorAdapter::new(MarkdownSurface::new());
        editor.sync_selection(&store)?;
        Ok(Self {
            store,
            editor,
            config_dir,
        })
    }

    /// Forwards pending editor changes and flushes on unload.
    pub fn dispose(mut self) -> Result<()> {
        self.editor.forward_changes(&mut self.store)?;
        self.editor.unmount();
        self.store.dispose()
    }

    pub fn store(&self) -> &PageStore<B> {
        &self.store
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.store.selected_page()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn create_page(&mut self, title: &str) -> Result<CmdResult> {
        self.editor.forward_changes(&mut self.store)?;
        let result = commands::create::run(&mut self.store, title)?;
        self.editor.sync_selection(&self.store)?;
        Ok(result)
    }

    pub fn list_pages(&self) -> Result<CmdResult> {
        commands::list::run(&self.store)
    }

    pub fn view_pages<I: AsRef<str>>(&self, selectors: &[I]) -> Result<CmdResult> {
        commands::view::run(&self.store, selectors)
    }

    pub fn rename_page(&mut self, selector: &str, title: &str) -> Result<CmdResult> {
        commands::rename::run(&mut self.store, selector, title)
    }

    pub fn delete_pages<I: AsRef<str>>(&mut self, selectors: &[I]) -> Result<CmdResult> {
        self.editor.forward_changes(&mut self.store)?;
        let result = commands::delete::run(&mut self.store, selectors)?;
        self.editor.sync_selection(&self.store)?;
        Ok(result)
    }

    pub fn select_page(&mut self, selector: &str) -> Result<CmdResult> {
        commands::select::run(&mut self.store, &mut self.editor, selector)
    }

    /// Opens a page in the editor and returns its markdown buffer.
    pub fn edit_buffer(&mut self, selector: &str) -> Result<(PageId, String)> {
        commands::edit::open(&mut self.store, &mut self.editor, selector)
    }

    pub fn apply_edit(&mut self, selector: &str, action: EditAction) -> Result<CmdResult> {
        commands::edit::run(&mut self.store, &mut self.editor, selector, action)
    }

    pub fn export(&self, output: Option<PathBuf>) -> Result<CmdResult> {
        commands::export::run(&self.store, output)
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.config_dir, action)
    }

    // --- Title field ---

    /// Focuses the title field of the selected page.
    pub fn focus_title(&mut self) -> Result<()> {
        match self.store.selected_id().cloned() {
            Some(id) => self.store.focus_title(&id),
            None => Err(PagenoteError::Api("No page is selected".to_string())),
        }
    }

    pub fn set_title_draft(&mut self, text: &str) -> Result<()> {
        self.store.set_title_draft(text)
    }

    pub fn title_draft(&self) -> Option<&str> {
        self.store.title_draft().map(|(_, text)| text)
    }

    /// Commits the title draft, if any. Returns the committed page.
    pub fn release_focus(&mut self) -> Result<Option<Page>> {
        let committed = self.store.release_focus()?;
        Ok(committed.and_then(|id| self.store.page(&id).cloned()))
    }

    /// Best-effort flush when the session loses focus.
    pub fn flush(&mut self, reason: FlushReason) -> Result<()> {
        self.editor.forward_changes(&mut self.store)?;
        self.store.flush(reason)
    }
}
