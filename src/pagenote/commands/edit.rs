use crate::commands::{select, CmdMessage, CmdResult};
use crate::editor::markdown::MarkdownSurface;
use crate::editor::EditorAdapter;
use crate::error::{PagenoteError, Result};
use crate::index::resolve;
use crate::model::PageId;
use crate::store::{PageStore, StorageBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Replace the whole document with a markdown buffer.
    Replace(String),
    /// Append markdown to the end of the document.
    Append(String),
}

/// Opens the page in the editor and returns its markdown buffer.
pub fn open<B: StorageBackend>(
    store: &mut PageStore<B>,
    editor: &mut EditorAdapter<MarkdownSurface>,
    selector: &str,
) -> Result<(PageId, String)> {
    let pos = resolve(store.pages(), selector)?;
    let id = store.pages()[pos].id.clone();
    select::switch(store, editor, &id)?;

    let handle = editor
        .handle()
        .ok_or_else(|| PagenoteError::Editor("No page is open in the editor".to_string()))?;
    Ok((id, handle.to_markdown()))
}

/// Applies an edit to the page and forwards the resulting change.
pub fn run<B: StorageBackend>(
    store: &mut PageStore<B>,
    editor: &mut EditorAdapter<MarkdownSurface>,
    selector: &str,
    action: EditAction,
) -> Result<CmdResult> {
    let (id, _) = open(store, editor, selector)?;
    let handle = editor
        .handle()
        .ok_or_else(|| PagenoteError::Editor("No page is open in the editor".to_string()))?;

    let changed = match &action {
        EditAction::Replace(text) => handle.replace_markdown(text),
        EditAction::Append(text) => handle.append_markdown(text) > 0,
    };
    editor.forward_changes(store)?;

    let mut result = CmdResult::default();
    let Some(page) = store.page(&id).cloned() else {
        return Ok(result);
    };
    if changed {
        result.add_message(CmdMessage::success(format!("Page updated: {}", page.title)));
    } else {
        result.add_message(CmdMessage::info(format!("No changes: {}", page.title)));
    }
    result.affected_pages.push(page);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn setup(backend: &MemBackend) -> (PageStore<&MemBackend>, EditorAdapter<MarkdownSurface>) {
        let mut store = PageStore::init(backend, "pages");
        store.load().unwrap();
        (store, EditorAdapter::new(MarkdownSurface::new()))
    }

    #[test]
    fn replace_writes_blocks() {
        let backend = MemBackend::new();
        let (mut store, mut editor) = setup(&backend);

        let result = run(
            &mut store,
            &mut editor,
            "1",
            EditAction::Replace("# Plan\n\n- eat\n- sleep".into()),
        )
        .unwrap();

        assert_eq!(result.affected_pages[0].content.len(), 3);
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn append_keeps_existing_blocks() {
        let backend = MemBackend::new();
        let (mut store, mut editor) = setup(&backend);
        run(&mut store, &mut editor, "1", EditAction::Replace("first".into())).unwrap();
        run(&mut store, &mut editor, "1", EditAction::Append("second".into())).unwrap();

        let (_, buffer) = open(&mut store, &mut editor, "1").unwrap();
        assert!(buffer.contains("first"));
        assert!(buffer.contains("second"));
        assert_eq!(store.pages()[0].content.len(), 2);
    }

    #[test]
    fn unchanged_buffer_is_not_written() {
        let backend = MemBackend::new();
        let (mut store, mut editor) = setup(&backend);
        run(&mut store, &mut editor, "1", EditAction::Replace("same".into())).unwrap();
        let writes = backend.write_count();

        let result = run(&mut store, &mut editor, "1", EditAction::Replace("same\n".into())).unwrap();
        assert_eq!(backend.write_count(), writes);
        assert!(result.messages[0].content.starts_with("No changes"));
    }
}
