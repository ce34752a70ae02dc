use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::resolve_ids;
use crate::store::{PageStore, StorageBackend};

pub fn run<B: StorageBackend, I: AsRef<str>>(
    store: &mut PageStore<B>,
    selectors: &[I],
) -> Result<CmdResult> {
    // Resolve everything up front: positions shift as pages go away.
    let ids = resolve_ids(store.pages(), selectors)?;
    let mut result = CmdResult::default();

    for id in ids {
        let page = store.delete_page(&id)?;
        result.add_message(CmdMessage::success(format!("Page deleted: {}", page.title)));
        result.affected_pages.push(page);
    }

    if store.is_empty() {
        result.add_message(CmdMessage::warning(
            "No pages left. The last saved collection stays on disk until a new page is created.",
        ));
    }

    Ok(result)
}
