use crate::commands::{CmdResult, PageView};
use crate::editor::markdown::blocks_to_markdown;
use crate::error::Result;
use crate::index::{index_pages, resolve};
use crate::store::{PageStore, StorageBackend};

pub fn run<B: StorageBackend, I: AsRef<str>>(
    store: &PageStore<B>,
    selectors: &[I],
) -> Result<CmdResult> {
    let indexed = index_pages(store.pages(), store.selected_id());
    let mut views = Vec::with_capacity(selectors.len());

    for selector in selectors {
        let pos = resolve(store.pages(), selector.as_ref())?;
        let page = indexed[pos].clone();
        let markdown = blocks_to_markdown(&page.page.content);
        views.push(PageView { page, markdown });
    }

    Ok(CmdResult::default().with_views(views))
}
