//! # Page Selection
//!
//! Pages are addressed from the command line in three ways, tried in order:
//!
//! 1. **Position**: `1`, `2`, ... the 1-based place in the sidebar.
//! 2. **Id**: the page's stored id, verbatim.
//! 3. **Title**: case-insensitive, exact match first, then a unique
//!    substring match.
//!
//! Positions win over ids because timestamp ids are numbers too, but they are
//! far larger than any realistic sidebar.

use crate::error::{PagenoteError, Result};
use crate::model::{Page, PageId};

/// A page as shown in the sidebar.
#[derive(Debug, Clone)]
pub struct DisplayPage {
    pub index: usize,
    pub page: Page,
    pub is_selected: bool,
}

/// Numbers pages in sidebar order, marking the selected one.
pub fn index_pages(pages: &[Page], selected: Option<&PageId>) -> Vec<DisplayPage> {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| DisplayPage {
            index: i + 1,
            page: page.clone(),
            is_selected: selected == Some(&page.id),
        })
        .collect()
}

/// Resolves a selector to a position in `pages`.
pub fn resolve(pages: &[Page], selector: &str) -> Result<usize> {
    let selector = selector.trim();

    if let Ok(n) = selector.parse::<usize>() {
        if (1..=pages.len()).contains(&n) {
            return Ok(n - 1);
        }
    }

    if let Some(pos) = pages.iter().position(|p| p.id.as_str() == selector) {
        return Ok(pos);
    }

    let needle = selector.to_lowercase();
    if let Some(pos) = pages.iter().position(|p| p.title.to_lowercase() == needle) {
        return Ok(pos);
    }

    let matches: Vec<usize> = pages
        .iter()
        .enumerate()
        .filter(|(_, p)| p.title.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [pos] => Ok(*pos),
        [] => Err(PagenoteError::Api(format!("No page matches \"{}\"", selector))),
        many => Err(PagenoteError::Api(format!(
            "\"{}\" matches {} pages, be more specific",
            selector,
            many.len()
        ))),
    }
}

/// Resolves several selectors, keeping input order and dropping repeats.
pub fn resolve_ids<I: AsRef<str>>(pages: &[Page], selectors: &[I]) -> Result<Vec<PageId>> {
    let mut ids: Vec<PageId> = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let id = pages[resolve(pages, selector.as_ref())?].id.clone();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<Page> {
        vec![
            Page::new(PageId::from("1700000000001"), "Getting Started"),
            Page::new(PageId::from("1700000000002"), "Groceries"),
            Page::new(PageId::from("x-9"), "Work Notes"),
        ]
    }

    #[test]
    fn by_position() {
        assert_eq!(resolve(&pages(), "2").unwrap(), 1);
    }

    #[test]
    fn by_id() {
        assert_eq!(resolve(&pages(), "1700000000002").unwrap(), 1);
        assert_eq!(resolve(&pages(), "x-9").unwrap(), 2);
    }

    #[test]
    fn out_of_range_number_is_not_a_position() {
        assert!(resolve(&pages(), "4").is_err());
    }

    #[test]
    fn by_title() {
        assert_eq!(resolve(&pages(), "groceries").unwrap(), 1);
        assert_eq!(resolve(&pages(), "work").unwrap(), 2);
    }

    #[test]
    fn ambiguous_title() {
        let err = resolve(&pages(), "g").unwrap_err();
        assert!(err.to_string().contains("matches 2 pages"));
    }

    #[test]
    fn resolve_ids_dedupes() {
        let ids = resolve_ids(&pages(), &["1", "Getting Started", "3"]).unwrap();
        assert_eq!(ids, vec![PageId::from("1700000000001"), PageId::from("x-9")]);
    }

    #[test]
    fn index_marks_selection() {
        let pages = pages();
        let shown = index_pages(&pages, Some(&pages[2].id));
        assert_eq!(shown[0].index, 1);
        assert!(!shown[0].is_selected);
        assert!(shown[2].is_selected);
    }
}
