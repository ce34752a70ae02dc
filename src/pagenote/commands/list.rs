use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::index_pages;
use crate::store::{PageStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &PageStore<B>) -> Result<CmdResult> {
    let listed = index_pages(store.pages(), store.selected_id());
    Ok(CmdResult::default().with_listed_pages(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn lists_in_order_with_selection() {
        let mut store = PageStore::init(MemBackend::new(), "pages");
        store.load().unwrap();
        create::run(&mut store, "Second").unwrap();

        let listed = run(&store).unwrap().listed_pages;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].page.title, "Getting Started");
        assert!(listed[1].is_selected);
    }
}
