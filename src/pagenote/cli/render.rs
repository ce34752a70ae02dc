//! Terminal output for the sidebar, page views and command messages.
//!
//! Layout math (widths, truncation, padding) is unicode-aware and kept in
//! plain functions returning lines, so it can be tested without a terminal.

use chrono::{DateTime, Utc};
use colored::Colorize;
use console::Term;
use pagenote::api::{CmdMessage, MessageLevel, PageView};
use pagenote::index::DisplayPage;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width used when the terminal size is unknown (piped output).
pub const DEFAULT_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const COLLAPSED_TITLE_WIDTH: usize = 16;
const SELECTED_MARKER: &str = "▸";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarMode {
    /// Full titles with relative creation times.
    Expanded,
    /// Short titles only, for narrow terminals.
    Collapsed,
}

impl SidebarMode {
    pub fn for_width(width: usize, breakpoint: usize) -> Self {
        if width < breakpoint {
            SidebarMode::Collapsed
        } else {
            SidebarMode::Expanded
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SidebarMode::Expanded => SidebarMode::Collapsed,
            SidebarMode::Collapsed => SidebarMode::Expanded,
        }
    }
}

pub fn terminal_width() -> usize {
    Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn print_sidebar(pages: &[DisplayPage], mode: SidebarMode, width: usize) {
    for line in render_sidebar(pages, mode, width) {
        println!("{}", line);
    }
}

pub fn render_sidebar(pages: &[DisplayPage], mode: SidebarMode, width: usize) -> Vec<String> {
    if pages.is_empty() {
        return vec!["No pages. Create one with `pagenote create`.".dimmed().to_string()];
    }
    pages.iter().map(|dp| render_entry(dp, mode, width)).collect()
}

fn render_entry(dp: &DisplayPage, mode: SidebarMode, width: usize) -> String {
    let marker = if dp.is_selected { SELECTED_MARKER } else { " " };
    let idx = format!("{}. ", dp.index);
    let prefix_width = 2 + marker.width() + idx.width();

    let idx_colored = if dp.is_selected {
        idx.yellow()
    } else {
        idx.normal()
    };

    match mode {
        SidebarMode::Collapsed => {
            let title = truncate_to_width(&dp.page.title, COLLAPSED_TITLE_WIDTH);
            let title = if dp.is_selected {
                title.bold()
            } else {
                title.normal()
            };
            format!(" {} {}{}", marker.yellow(), idx_colored, title)
        }
        SidebarMode::Expanded => {
            let available = width.saturating_sub(prefix_width + TIME_WIDTH);
            let title = truncate_to_width(&dp.page.title, available);
            let padding = available.saturating_sub(title.width());
            let time_ago = dp
                .page
                .id
                .created_at()
                .map(format_time_ago)
                .unwrap_or_else(|| " ".repeat(TIME_WIDTH));
            let title = if dp.is_selected {
                title.bold()
            } else {
                title.normal()
            };
            format!(
                " {} {}{}{}{}",
                marker.yellow(),
                idx_colored,
                title,
                " ".repeat(padding),
                time_ago.dimmed()
            )
        }
    }
}

pub fn print_views(views: &[PageView]) {
    for (i, view) in views.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!(
            "{} {}",
            format!("{}.", view.page.index).yellow(),
            view.page.page.title.bold()
        );
        println!("--------------------------------");
        if view.markdown.trim().is_empty() {
            println!("{}", "(empty)".dimmed());
        } else {
            println!("{}", view.markdown.trim_end());
        }
    }
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagenote::model::{Page, PageId};

    fn display(index: usize, title: &str, selected: bool) -> DisplayPage {
        DisplayPage {
            index,
            page: Page::new(PageId::from_millis(Utc::now().timestamp_millis()), title),
            is_selected: selected,
        }
    }

    #[test]
    fn mode_follows_breakpoint() {
        assert_eq!(SidebarMode::for_width(79, 80), SidebarMode::Collapsed);
        assert_eq!(SidebarMode::for_width(80, 80), SidebarMode::Expanded);
        assert_eq!(SidebarMode::Expanded.toggled(), SidebarMode::Collapsed);
    }

    #[test]
    fn truncates_wide_text() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 6), "日本…");
    }

    #[test]
    fn collapsed_entries_are_short() {
        colored::control::set_override(false);
        let pages = vec![
            display(1, "A rather long page title that goes on", true),
            display(2, "Two", false),
        ];
        let lines = render_sidebar(&pages, SidebarMode::Collapsed, 40);
        assert_eq!(lines[0], format!(" ▸ 1. {}", truncate_to_width(&pages[0].page.title, 16)));
        assert_eq!(lines[1], "   2. Two");
    }

    #[test]
    fn expanded_entries_fill_width() {
        colored::control::set_override(false);
        let lines = render_sidebar(&[display(1, "Notes", false)], SidebarMode::Expanded, 60);
        assert!(lines[0].starts_with("   1. Notes"));
        assert_eq!(lines[0].width(), 60);
    }

    #[test]
    fn empty_sidebar_hint() {
        let lines = render_sidebar(&[], SidebarMode::Expanded, 60);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("No pages"));
    }
}
