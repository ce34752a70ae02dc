use crate::model::PageId;
use crate::store::page_store::LoadState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagenoteError {
    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Page store is not ready (state: {0})")]
    NotReady(LoadState),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PagenoteError>;
