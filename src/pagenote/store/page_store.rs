//! The page collection and its persistence rules.
//!
//! A [`PageStore`] owns the ordered list of pages, the current selection and
//! the one storage slot they are mirrored to. Every mutation writes the whole
//! collection back through the [`StorageBackend`].
//!
//! ## Lifecycle
//!
//! ```text
//! init() ──► Uninitialized ──begin_load()──► Loading ──finish_load()──► Ready
//!                                                                        │
//!                                                             dispose() ◄┘
//! ```
//!
//! Content updates coming from the editor are rejected until the store is
//! `Ready`. An editing surface mounted while the collection is still being
//! read would otherwise report its empty document and clobber the freshly
//! loaded content.

use super::backend::StorageBackend;
use crate::error::{PagenoteError, Result};
use crate::model::{normalize_record, Block, LoadedRecord, Page, PageId, DEFAULT_PAGE_TITLE};
use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Uninitialized => "uninitialized",
            LoadState::Loading => "loading",
            LoadState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Why a best-effort flush was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The application lost focus.
    Blur,
    /// The application is going away.
    Unload,
}

/// Uncommitted text in the title field.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TitleDraft {
    page: PageId,
    text: String,
}

pub struct PageStore<B: StorageBackend> {
    backend: B,
    key: String,
    pages: Vec<Page>,
    selected: Option<PageId>,
    state: LoadState,
    pending: Option<String>,
    title_draft: Option<TitleDraft>,
    last_issued_ms: i64,
}

impl<B: StorageBackend> PageStore<B> {
    /// Creates an empty, uninitialized store mirrored to slot `key`.
    pub fn init(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            pages: Vec::new(),
            selected: None,
            state: LoadState::Uninitialized,
            pending: None,
            title_draft: None,
            last_issued_ms: 0,
        }
    }

    /// Flushes on unload and releases the store.
    pub fn dispose(mut self) -> Result<()> {
        if self.state == LoadState::Ready {
            self.flush(FlushReason::Unload)?;
        }
        debug!("Disposed page store for '{}'", self.key);
        Ok(())
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|p| &p.id == id)
    }

    pub fn selected_id(&self) -> Option<&PageId> {
        self.selected.as_ref()
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.selected.as_ref().and_then(|id| self.page(id))
    }

    // --- Loading ---

    /// Reads the persisted collection and makes the store ready.
    pub fn load(&mut self) -> Result<()> {
        self.begin_load();
        self.finish_load()
    }

    /// First half of [`load`](Self::load): enters `Loading` and reads the slot.
    ///
    /// Read failures are logged and treated as "no saved data".
    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
        self.pending = match self.backend.read_slot(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to read saved pages from '{}': {}", self.key, e);
                None
            }
        };
    }

    /// Second half of [`load`](Self::load): installs what was read.
    ///
    /// Falls back to a single default page when nothing usable was saved.
    /// Loading never writes storage.
    pub fn finish_load(&mut self) -> Result<()> {
        if self.state != LoadState::Loading {
            return Err(PagenoteError::NotReady(self.state));
        }

        let records = match self.pending.take() {
            Some(raw) => match parse_collection(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!("Discarding unreadable saved pages in '{}': {}", self.key, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        self.pages = Vec::with_capacity(records.len().max(1));
        self.title_draft = None;

        if records.is_empty() {
            info!("No saved pages, starting with '{}'", DEFAULT_PAGE_TITLE);
            let id = self.fresh_id(&HashSet::new());
            self.pages.push(Page::new(id, DEFAULT_PAGE_TITLE));
        } else {
            let reserved: HashSet<PageId> = records.iter().filter_map(|r| r.id.clone()).collect();
            for record in records {
                self.install(record, &reserved);
            }
        }

        self.selected = self.pages.first().map(|p| p.id.clone());
        self.state = LoadState::Ready;
        info!("Loaded {} page(s) from '{}'", self.pages.len(), self.key);
        Ok(())
    }

    fn install(&mut self, record: LoadedRecord, reserved: &HashSet<PageId>) {
        let id = match record.id {
            Some(id) if self.index_of(&id).is_none() => id,
            Some(id) => {
                warn!("Duplicate page id {} in saved pages, assigning a new one", id);
                self.fresh_id(reserved)
            }
            None => self.fresh_id(reserved),
        };
        self.pages.push(Page {
            id,
            title: record.title,
            content: record.content,
        });
    }

    // --- Mutations ---

    /// Appends a new empty page and selects it.
    pub fn create_page(&mut self, title: &str) -> Result<PageId> {
        self.ensure_ready()?;
        let id = self.fresh_id(&HashSet::new());
        let page = Page::new(id.clone(), title);
        info!("Created page {} ({})", page.id, page.title);
        self.pages.push(page);
        self.selected = Some(id.clone());
        self.persist()?;
        Ok(id)
    }

    /// Removes a page, moving the selection to the first remaining page if
    /// the removed one was selected.
    ///
    /// A focused title field is released (and its draft committed) first.
    pub fn delete_page(&mut self, id: &PageId) -> Result<Page> {
        self.ensure_ready()?;
        self.release_focus()?;

        let idx = self
            .index_of(id)
            .ok_or_else(|| PagenoteError::PageNotFound(id.clone()))?;
        let page = self.pages.remove(idx);

        if self.selected.as_ref() == Some(id) {
            self.selected = self.pages.first().map(|p| p.id.clone());
        }
        info!("Deleted page {} ({})", page.id, page.title);

        self.persist()?;
        Ok(page)
    }

    pub fn update_title(&mut self, id: &PageId, title: &str) -> Result<()> {
        self.ensure_ready()?;
        self.page_mut(id)?.set_title(title);
        self.persist()
    }

    /// Replaces a page's content.
    ///
    /// Rejected with [`PagenoteError::NotReady`] until loading has finished.
    pub fn update_content(&mut self, id: &PageId, content: Vec<Block>) -> Result<()> {
        if self.state != LoadState::Ready {
            debug!("Suppressed content update for {} while {}", id, self.state);
            return Err(PagenoteError::NotReady(self.state));
        }
        self.page_mut(id)?.content = content;
        self.persist()
    }

    /// Switches the selection to `id`.
    ///
    /// `outgoing` is the live content of the currently selected page. When the
    /// store is ready it is written into the collection and persisted before
    /// the selection changes. Returns false if `id` was already selected.
    pub fn select_page(&mut self, id: &PageId, outgoing: Option<Vec<Block>>) -> Result<bool> {
        if self.selected.as_ref() == Some(id) {
            return Ok(false);
        }
        if self.index_of(id).is_none() {
            return Err(PagenoteError::PageNotFound(id.clone()));
        }

        if self.state == LoadState::Ready {
            if let (Some(current), Some(content)) = (self.selected.clone(), outgoing) {
                if let Some(idx) = self.index_of(&current) {
                    self.pages[idx].content = content;
                }
            }
            self.persist()?;
        } else {
            debug!("Selecting {} without flush while {}", id, self.state);
        }

        self.selected = Some(id.clone());
        Ok(true)
    }

    // --- Title field ---

    /// Gives the title field focus for page `id`, seeded with its title.
    pub fn focus_title(&mut self, id: &PageId) -> Result<()> {
        self.ensure_ready()?;
        if self.title_draft.as_ref().is_some_and(|d| &d.page != id) {
            self.release_focus()?;
        }
        let title = self
            .page(id)
            .map(|p| p.title.clone())
            .ok_or_else(|| PagenoteError::PageNotFound(id.clone()))?;
        if self.title_draft.is_none() {
            self.title_draft = Some(TitleDraft {
                page: id.clone(),
                text: title,
            });
        }
        Ok(())
    }

    /// Replaces the text of the focused title field without committing it.
    pub fn set_title_draft(&mut self, text: &str) -> Result<()> {
        match self.title_draft.as_mut() {
            Some(draft) => {
                draft.text = text.to_string();
                Ok(())
            }
            None => Err(PagenoteError::Api("No title field is focused".to_string())),
        }
    }

    pub fn title_draft(&self) -> Option<(&PageId, &str)> {
        self.title_draft
            .as_ref()
            .map(|d| (&d.page, d.text.as_str()))
    }

    /// Blurs the title field, committing its draft.
    ///
    /// Returns the page whose title was committed, if any.
    pub fn release_focus(&mut self) -> Result<Option<PageId>> {
        let Some(draft) = self.title_draft.take() else {
            return Ok(None);
        };
        if self.index_of(&draft.page).is_none() {
            return Ok(None);
        }
        self.update_title(&draft.page, &draft.text)?;
        Ok(Some(draft.page))
    }

    // --- Persistence ---

    /// Writes the whole collection to the slot.
    ///
    /// Skipped while the collection is empty.
    pub fn persist(&self) -> Result<()> {
        if self.pages.is_empty() {
            debug!("Skipping persist of empty collection to '{}'", self.key);
            return Ok(());
        }
        let json = serde_json::to_string(&self.pages).map_err(PagenoteError::Serialization)?;
        self.backend.write_slot(&self.key, &json)?;
        debug!("Persisted {} page(s) to '{}'", self.pages.len(), self.key);
        Ok(())
    }

    /// Best-effort flush on blur or unload.
    pub fn flush(&mut self, reason: FlushReason) -> Result<()> {
        if self.state != LoadState::Ready {
            return Ok(());
        }
        debug!("Flushing pages on {:?}", reason);
        if self.release_focus()?.is_none() {
            self.persist()?;
        }
        Ok(())
    }

    // --- Helpers ---

    fn ensure_ready(&self) -> Result<()> {
        if self.state == LoadState::Ready {
            Ok(())
        } else {
            Err(PagenoteError::NotReady(self.state))
        }
    }

    fn index_of(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| &p.id == id)
    }

    fn page_mut(&mut self, id: &PageId) -> Result<&mut Page> {
        self.pages
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| PagenoteError::PageNotFound(id.clone()))
    }

    /// Timestamp-derived id, bumped past anything already issued or taken.
    fn fresh_id(&mut self, reserved: &HashSet<PageId>) -> PageId {
        let mut millis = Utc::now().timestamp_millis().max(self.last_issued_ms + 1);
        loop {
            let id = PageId::from_millis(millis);
            if !reserved.contains(&id) && self.index_of(&id).is_none() {
                self.last_issued_ms = millis;
                return id;
            }
            millis += 1;
        }
    }
}

/// Parses a persisted collection into normalized records.
fn parse_collection(raw: &str) -> Result<Vec<LoadedRecord>> {
    let value: Value = serde_json::from_str(raw).map_err(PagenoteError::Serialization)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(normalize_record).collect()),
        other => Err(PagenoteError::Store(format!(
            "expected an array of pages, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
