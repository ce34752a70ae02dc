use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Title used whenever a page has an empty or missing title.
pub const UNTITLED: &str = "Untitled";

/// Title of the page created when storage holds nothing usable.
pub const DEFAULT_PAGE_TITLE: &str = "Getting Started";

/// Opaque page identifier.
///
/// New ids are derived from the creation timestamp (milliseconds since the
/// epoch, as a decimal string), but loaded ids are kept verbatim whatever
/// their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in a timestamp-derived id, if this is one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.0.parse().ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One unit of rich content as produced by an editing surface.
///
/// The store treats blocks as an uninterpreted JSON tree: they are stored and
/// replayed verbatim. Only editing surfaces look inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(Value);

impl Block {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Block {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub content: Vec<Block>,
}

impl Page {
    pub fn new(id: PageId, title: &str) -> Self {
        Self {
            id,
            title: title_or_untitled(title),
            content: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title_or_untitled(title);
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub fn title_or_untitled(title: &str) -> String {
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

/// A persisted record after field-level defaulting.
///
/// The id stays optional here: assigning fresh ids needs the whole collection
/// in view, which is the store's job.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecord {
    pub id: Option<PageId>,
    pub title: String,
    pub content: Vec<Block>,
}

/// Applies field-level defaults to one record of a persisted collection.
///
/// Any JSON value is accepted. Records that are not objects come back with
/// every field defaulted.
pub fn normalize_record(value: &Value) -> LoadedRecord {
    let id = match value.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(PageId::new(s.as_str())),
        Some(Value::Number(n)) => Some(PageId::new(n.to_string())),
        _ => None,
    };

    let title = match value.get("title") {
        Some(Value::String(s)) => title_or_untitled(s),
        _ => UNTITLED.to_string(),
    };

    let content = match value.get("content") {
        Some(Value::Array(items)) => items.iter().cloned().map(Block::new).collect(),
        _ => Vec::new(),
    };

    LoadedRecord { id, title, content }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_page_defaults_empty_title() {
        let page = Page::new(PageId::from_millis(1), "");
        assert_eq!(page.title, UNTITLED);
        assert!(page.content.is_empty());
    }

    #[test]
    fn set_title_defaults_empty() {
        let mut page = Page::new(PageId::from_millis(1), "Notes");
        page.set_title("");
        assert_eq!(page.title, "Untitled");
    }

    #[test]
    fn whitespace_title_is_kept() {
        assert_eq!(title_or_untitled("  "), "  ");
    }

    #[test]
    fn normalize_missing_content() {
        let record = normalize_record(&json!({"id": "42", "title": "A"}));
        assert_eq!(record.id, Some(PageId::from("42")));
        assert_eq!(record.title, "A");
        assert!(record.content.is_empty());
    }

    #[test]
    fn normalize_non_array_content() {
        let record = normalize_record(&json!({"id": "1", "title": "A", "content": "oops"}));
        assert!(record.content.is_empty());

        let record = normalize_record(&json!({"id": "1", "title": "A", "content": null}));
        assert!(record.content.is_empty());
    }

    #[test]
    fn normalize_missing_and_empty_title() {
        assert_eq!(normalize_record(&json!({"id": "1"})).title, UNTITLED);
        assert_eq!(normalize_record(&json!({"title": ""})).title, UNTITLED);
        assert_eq!(normalize_record(&json!({"title": 7})).title, UNTITLED);
    }

    #[test]
    fn normalize_ids() {
        assert_eq!(normalize_record(&json!({"title": "x"})).id, None);
        assert_eq!(normalize_record(&json!({"id": ""})).id, None);
        assert_eq!(
            normalize_record(&json!({"id": 1700000000000_i64})).id,
            Some(PageId::from("1700000000000"))
        );
    }

    #[test]
    fn normalize_non_object_record() {
        let record = normalize_record(&json!(3));
        assert_eq!(record.id, None);
        assert_eq!(record.title, UNTITLED);
        assert!(record.content.is_empty());
    }

    #[test]
    fn blocks_are_kept_verbatim() {
        let block = json!({"type": "mystery", "deep": [{"a": 1}, null, "s"]});
        let record = normalize_record(&json!({"id": "1", "content": [block.clone()]}));
        assert_eq!(record.content, vec![Block::new(block)]);
    }

    #[test]
    fn page_serializes_flat() {
        let mut page = Page::new(PageId::from("9"), "T");
        page.content.push(Block::new(json!({"type": "paragraph"})));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            json!({"id": "9", "title": "T", "content": [{"type": "paragraph"}]})
        );
    }

    #[test]
    fn created_at_from_timestamp_id() {
        let id = PageId::from_millis(1_700_000_000_000);
        assert_eq!(id.created_at().unwrap().timestamp(), 1_700_000_000);
        assert!(PageId::from("not-a-time").created_at().is_none());
    }
}
