use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::resolve;
use crate::store::{PageStore, StorageBackend};

pub fn run<B: StorageBackend>(
    store: &mut PageStore<B>,
    selector: &str,
    title: &str,
) -> Result<CmdResult> {
    let pos = resolve(store.pages(), selector)?;
    let id = store.pages()[pos].id.clone();
    let old_title = store.pages()[pos].title.clone();

    store.update_title(&id, title)?;

    let mut result = CmdResult::default();
    if let Some(page) = store.page(&id).cloned() {
        result.add_message(CmdMessage::success(format!(
            "Page renamed ({}): {} -> {}",
            pos + 1,
            old_title,
            page.title
        )));
        result.affected_pages.push(page);
    }
    Ok(result)
}
