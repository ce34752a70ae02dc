use crate::commands::{CmdMessage, CmdResult};
use crate::editor::{EditingSurface, EditorAdapter};
use crate::error::Result;
use crate::index::resolve;
use crate::model::PageId;
use crate::store::{PageStore, StorageBackend};

/// Switches the selection, flushing the editor's live content for the
/// outgoing page first, then rebuilds the editor for the new page.
pub fn switch<B: StorageBackend, S: EditingSurface>(
    store: &mut PageStore<B>,
    editor: &mut EditorAdapter<S>,
    id: &PageId,
) -> Result<bool> {
    let outgoing = match (editor.mounted_page(), store.selected_id()) {
        (Some(mounted), Some(selected)) if mounted == selected => editor.current_blocks(),
        _ => None,
    };
    let switched = store.select_page(id, outgoing)?;
    editor.sync_selection(store)?;
    Ok(switched)
}

pub fn run<B: StorageBackend, S: EditingSurface>(
    store: &mut PageStore<B>,
    editor: &mut EditorAdapter<S>,
    selector: &str,
) -> Result<CmdResult> {
    let pos = resolve(store.pages(), selector)?;
    let id = store.pages()[pos].id.clone();

    let mut result = CmdResult::default();
    if switch(store, editor, &id)? {
        if let Some(page) = store.page(&id).cloned() {
            result.add_message(CmdMessage::info(format!(
                "Opened ({}): {}",
                pos + 1,
                page.title
            )));
            result.affected_pages.push(page);
        }
    }
    Ok(result)
}
