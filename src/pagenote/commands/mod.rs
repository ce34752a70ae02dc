use crate::config::PagenoteConfig;
use crate::index::DisplayPage;
use crate::model::Page;
use std::path::PathBuf;

pub mod config;
pub mod create;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod rename;
pub mod select;
pub mod view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A page together with its markdown rendering.
#[derive(Debug, Clone)]
pub struct PageView {
    pub page: DisplayPage,
    pub markdown: String,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_pages: Vec<Page>,
    pub listed_pages: Vec<DisplayPage>,
    pub views: Vec<PageView>,
    pub config: Option<PagenoteConfig>,
    pub output_path: Option<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_pages(mut self, pages: Vec<Page>) -> Self {
        self.affected_pages = pages;
        self
    }

    pub fn with_listed_pages(mut self, pages: Vec<DisplayPage>) -> Self {
        self.listed_pages = pages;
        self
    }

    pub fn with_views(mut self, views: Vec<PageView>) -> Self {
        self.views = views;
        self
    }

    pub fn with_config(mut self, config: PagenoteConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
}
