use pagenote::api::{EditAction, PagenoteApi};
use pagenote::store::fs_backend::FsBackend;
use pagenote::store::mem_backend::MemBackend;
use pagenote::store::{FlushReason, PageStore, StorageBackend};
use serde_json::Value;
use std::path::PathBuf;

const KEY: &str = "pagenote-pages";

fn open(backend: &MemBackend) -> PagenoteApi<&MemBackend> {
    PagenoteApi::open(backend, KEY, PathBuf::from("unused")).unwrap()
}

fn saved(backend: &MemBackend) -> Vec<Value> {
    serde_json::from_str(&backend.snapshot(KEY).unwrap()).unwrap()
}

#[test]
fn empty_array_starts_with_getting_started_then_persists_on_mutation() {
    let backend = MemBackend::with_slot(KEY, "[]");
    let mut api = open(&backend);

    let page = api.selected_page().unwrap().clone();
    assert_eq!(page.title, "Getting Started");
    assert_eq!(backend.snapshot(KEY).as_deref(), Some("[]"));

    api.apply_edit("1", EditAction::Replace("First words".into()))
        .unwrap();
    let saved = saved(&backend);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["id"], page.id.as_str());
    assert_eq!(saved[0]["title"], "Getting Started");
}

#[test]
fn create_rename_delete_other() {
    let backend = MemBackend::new();
    let mut api = open(&backend);
    let other = api.selected_page().unwrap().id.clone();

    let created = api.create_page("").unwrap().affected_pages[0].clone();
    assert_eq!(created.title, "Untitled");

    api.rename_page("Untitled", "Notes").unwrap();
    api.delete_pages(&[other.as_str()]).unwrap();

    let pages = api.store().pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].id, created.id);
    assert_eq!(pages[0].title, "Notes");
    assert_eq!(api.store().selected_id(), Some(&created.id));

    let saved = saved(&backend);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["title"], "Notes");
    assert_eq!(saved[0]["id"], created.id.as_str());
}

#[test]
fn switching_pages_saves_outgoing_content() {
    let backend = MemBackend::new();
    let mut api = open(&backend);
    api.create_page("Second").unwrap();
    api.select_page("1").unwrap();

    api.apply_edit("1", EditAction::Append("carried over".into()))
        .unwrap();
    api.select_page("Second").unwrap();

    assert!(saved(&backend)[0]["content"]
        .to_string()
        .contains("carried over"));
    assert_eq!(api.selected_page().unwrap().title, "Second");
}

#[test]
fn reopening_restores_collection_and_selects_first() {
    let backend = MemBackend::new();
    {
        let mut api = open(&backend);
        api.create_page("Second").unwrap();
        api.apply_edit("Second", EditAction::Replace("## Body\n\ntext".into()))
            .unwrap();
        api.dispose().unwrap();
    }

    let api = open(&backend);
    let titles: Vec<&str> = api.store().pages().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Getting Started", "Second"]);
    assert_eq!(api.selected_page().unwrap().title, "Getting Started");

    let view = api.view_pages(&["2"]).unwrap();
    assert!(view.views[0].markdown.contains("## Body"));
}

#[test]
fn title_draft_committed_by_blur_flush() {
    let backend = MemBackend::new();
    let mut api = open(&backend);
    api.focus_title().unwrap();
    api.set_title_draft("Drafted").unwrap();
    assert_eq!(backend.write_count(), 0);

    api.flush(FlushReason::Blur).unwrap();
    assert_eq!(saved(&backend)[0]["title"], "Drafted");
}

#[test]
fn malformed_records_are_normalized() {
    let backend = MemBackend::with_slot(
        KEY,
        r#"[{"id": 42, "title": null}, {"id": "b", "title": "B", "content": {"not": "a list"}}]"#,
    );
    let api = open(&backend);
    let pages = api.store().pages();

    assert_eq!(pages[0].id.as_str(), "42");
    assert_eq!(pages[0].title, "Untitled");
    assert!(pages[1].content.is_empty());
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn file_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = PageStore::init(FsBackend::new(dir.path().to_path_buf()), KEY);
        store.load().unwrap();
        store.create_page("On disk").unwrap();
        store.dispose().unwrap();
    }

    let backend = FsBackend::new(dir.path().to_path_buf());
    assert!(backend.slot_path(KEY).exists());
    let raw = backend.read_slot(KEY).unwrap().unwrap();
    assert!(raw.contains("On disk"));

    let mut store = PageStore::init(backend, KEY);
    store.load().unwrap();
    assert_eq!(store.len(), 2);
}
