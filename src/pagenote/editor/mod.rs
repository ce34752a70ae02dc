//! # Editor Adapter
//!
//! Bridges an editing surface to the page store.
//!
//! An [`EditingSurface`] owns its own document model. The adapter only knows
//! three things about it: how to build a handle from a page's blocks, how to
//! subscribe to its change notifications and how to read back its top-level
//! blocks.
//!
//! ```text
//!   PageStore ──mount(page)──► EditorAdapter ──initialize(blocks)──► Surface
//!       ▲                            │                                  │
//!       └──update_content(blocks)────┘◄──────── change notification ────┘
//! ```
//!
//! The surface is rebuilt from scratch whenever the selected page changes;
//! the old handle is unsubscribed and dropped before the new one exists, so a
//! late notification can never land on the wrong page.
//!
//! Notifications are recorded as they arrive and forwarded to the store by
//! [`EditorAdapter::forward_changes`]. This keeps the store out of the
//! listener closure and lets the adapter borrow it mutably only when asked.

use crate::error::{PagenoteError, Result};
use crate::model::{Block, Page, PageId};
use crate::store::{PageStore, StorageBackend};
use log::debug;
use std::cell::Cell;
use std::rc::Rc;

pub mod external;
pub mod markdown;
pub mod notify;

pub use notify::{ChangeNotifier, Subscription};

/// A live editing session over one document.
pub trait SurfaceHandle {
    /// Registers a change listener. It stays attached while the returned
    /// subscription is alive.
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> Subscription;

    /// The document's current top-level block sequence.
    fn top_level_blocks(&self) -> Vec<Block>;
}

/// Something that can host a page's blocks for editing.
pub trait EditingSurface {
    type Handle: SurfaceHandle;

    /// Builds a fresh editing session. An empty slice is an empty document.
    fn initialize(&mut self, blocks: &[Block]) -> Result<Self::Handle>;
}

struct Mounted<H> {
    // Declared first so it is dropped before the handle.
    _subscription: Subscription,
    page: PageId,
    handle: H,
    pending: Rc<Cell<usize>>,
}

pub struct EditorAdapter<S: EditingSurface> {
    surface: S,
    mounted: Option<Mounted<S::Handle>>,
}

impl<S: EditingSurface> EditorAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            mounted: None,
        }
    }

    /// Rebuilds the surface for `page` and subscribes to its changes.
    pub fn mount(&mut self, page: &Page) -> Result<()> {
        self.unmount();

        let handle = self.surface.initialize(&page.content)?;
        let pending = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pending);
        let subscription = handle.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        debug!("Mounted editor for page {}", page.id);
        self.mounted = Some(Mounted {
            _subscription: subscription,
            page: page.id.clone(),
            handle,
            pending,
        });
        Ok(())
    }

    /// Unsubscribes and drops the current session, returning its page.
    pub fn unmount(&mut self) -> Option<PageId> {
        let mounted = self.mounted.take()?;
        debug!("Unmounted editor for page {}", mounted.page);
        Some(mounted.page)
    }

    pub fn mounted_page(&self) -> Option<&PageId> {
        self.mounted.as_ref().map(|m| &m.page)
    }

    pub fn handle(&self) -> Option<&S::Handle> {
        self.mounted.as_ref().map(|m| &m.handle)
    }

    /// Number of change notifications not yet forwarded.
    pub fn pending_changes(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.pending.get())
    }

    /// Live content of the mounted page.
    pub fn current_blocks(&self) -> Option<Vec<Block>> {
        self.mounted.as_ref().map(|m| m.handle.top_level_blocks())
    }

    /// Forwards recorded changes to the store.
    ///
    /// Returns true when content was written. Updates the store rejects
    /// because it is still loading are dropped.
    pub fn forward_changes<B: StorageBackend>(&mut self, store: &mut PageStore<B>) -> Result<bool> {
        let Some(mounted) = self.mounted.as_ref() else {
            return Ok(false);
        };
        if mounted.pending.get() == 0 {
            return Ok(false);
        }
        mounted.pending.set(0);

        let blocks = mounted.handle.top_level_blocks();
        match store.update_content(&mounted.page, blocks) {
            Ok(()) => Ok(true),
            Err(PagenoteError::NotReady(state)) => {
                debug!(
                    "Dropped editor change for {} while store is {}",
                    mounted.page, state
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Makes the mounted page follow the store's selection.
    ///
    /// Remounts only when the selected page differs from the mounted one.
    pub fn sync_selection<B: StorageBackend>(&mut self, store: &PageStore<B>) -> Result<()> {
        match store.selected_page() {
            Some(page) if self.mounted_page() != Some(&page.id) => self.mount(page),
            Some(_) => Ok(()),
            None => {
                self.unmount();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::markdown::MarkdownSurface;
    use super::*;
    use crate::store::mem_backend::MemBackend;

    const KEY: &str = "pages";

    fn setup(backend: &MemBackend) -> (PageStore<&MemBackend>, EditorAdapter<MarkdownSurface>) {
        let mut store = PageStore::init(backend, KEY);
        store.load().unwrap();
        let mut adapter = EditorAdapter::new(MarkdownSurface::new());
        adapter.sync_selection(&store).unwrap();
        (store, adapter)
    }

    #[test]
    fn mount_follows_selection() {
        let backend = MemBackend::new();
        let (mut store, mut adapter) = setup(&backend);
        assert_eq!(adapter.mounted_page(), store.selected_id());

        let id = store.create_page("Next").unwrap();
        adapter.sync_selection(&store).unwrap();
        assert_eq!(adapter.mounted_page(), Some(&id));
    }

    #[test]
    fn change_is_forwarded_to_store() {
        let backend = MemBackend::new();
        let (mut store, mut adapter) = setup(&backend);

        adapter.handle().unwrap().replace_markdown("Hello there");
        assert_eq!(adapter.pending_changes(), 1);
        assert!(adapter.forward_changes(&mut store).unwrap());
        assert_eq!(adapter.pending_changes(), 0);

        let page = store.selected_page().unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].as_value()["type"], "paragraph");
        assert!(backend.snapshot(KEY).unwrap().contains("Hello there"));
    }

    #[test]
    fn nothing_pending_means_no_write() {
        let backend = MemBackend::new();
        let (mut store, mut adapter) = setup(&backend);
        assert!(!adapter.forward_changes(&mut store).unwrap());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn remount_detaches_old_handle() {
        let backend = MemBackend::new();
        let (mut store, mut adapter) = setup(&backend);
        let first = store.selected_id().cloned().unwrap();

        let old_notifier = adapter.handle().unwrap().notifier().clone();
        assert_eq!(old_notifier.listener_count(), 1);

        store.create_page("Second").unwrap();
        adapter.sync_selection(&store).unwrap();
        assert_eq!(old_notifier.listener_count(), 0);

        old_notifier.notify();
        assert_eq!(adapter.pending_changes(), 0);
        assert!(!adapter.forward_changes(&mut store).unwrap());
        assert!(store.page(&first).unwrap().content.is_empty());
    }

    #[test]
    fn changes_during_load_are_dropped() {
        let backend = MemBackend::with_slot(
            KEY,
            r#"[{"id":"1","title":"One","content":[{"type":"paragraph","content":[{"type":"text","text":"saved"}]}]}]"#,
        );
        let (mut store, mut adapter) = setup(&backend);

        store.begin_load();
        adapter.handle().unwrap().replace_markdown("");
        assert!(!adapter.forward_changes(&mut store).unwrap());
        store.finish_load().unwrap();

        assert_eq!(store.pages()[0].content.len(), 1);
    }

    #[test]
    fn unmount_when_selection_cleared() {
        let backend = MemBackend::new();
        let (mut store, mut adapter) = setup(&backend);
        let id = store.selected_id().cloned().unwrap();
        store.delete_page(&id).unwrap();

        adapter.sync_selection(&store).unwrap();
        assert_eq!(adapter.mounted_page(), None);
        assert_eq!(adapter.current_blocks(), None);
    }
}
