use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{PageStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &mut PageStore<B>, title: &str) -> Result<CmdResult> {
    let id = store.create_page(title)?;
    let position = store.len();
    let page = store.page(&id).cloned();

    let mut result = CmdResult::default();
    if let Some(page) = page {
        result.add_message(CmdMessage::success(format!(
            "Page created ({}): {}",
            position, page.title
        )));
        result.affected_pages.push(page);
    }
    Ok(result)
}
