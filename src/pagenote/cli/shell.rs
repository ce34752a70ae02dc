//! Interactive session.
//!
//! The shell is the long-lived counterpart of a browser tab: the store is
//! loaded once, every command runs against the same in-memory session, the
//! title field can hold an uncommitted draft, and leaving the shell performs
//! the unload flush.
//!
//! Focus rules:
//! - `title` focuses the title field; any other command blurs it first,
//!   committing the draft.
//! - `edit` is a blur of the whole session: everything is flushed before the
//!   external editor takes over the terminal.

use super::render::{print_messages, print_sidebar, print_views, terminal_width, SidebarMode};
use super::AppContext;
use colored::Colorize;
use log::warn;
use pagenote::api::EditAction;
use pagenote::editor::external::edit_buffer;
use pagenote::error::{PagenoteError, Result};
use pagenote::store::FlushReason;
use std::io::{BufRead, Write};

const HELP: &str = "\
ls                 show the sidebar
open <page>        select a page
new [title]        create a page
title [text]       focus the title field (and set its draft)
commit             commit the title draft
rm <page>...       delete pages
view [page]        print a page
edit [page]        edit a page in $EDITOR
write <markdown>   replace the selected page's content
append <markdown>  append to the selected page's content
sidebar            toggle expanded/collapsed sidebar
help               this text
quit               save and leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Open(String),
    New(String),
    Title(Option<String>),
    Commit,
    Delete(Vec<String>),
    View(Option<String>),
    Edit(Option<String>),
    Write(String),
    Append(String),
    Sidebar,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = || (!rest.is_empty()).then(|| rest.to_string());

        let cmd = match word {
            "ls" | "list" => ShellCommand::List,
            "open" | "select" => ShellCommand::Open(arg().ok_or("usage: open <page>")?),
            "new" | "n" => ShellCommand::New(rest.to_string()),
            "title" => ShellCommand::Title(arg()),
            "commit" => ShellCommand::Commit,
            "rm" | "delete" => {
                if rest.is_empty() {
                    return Err("usage: rm <page>...".to_string());
                }
                ShellCommand::Delete(rest.split_whitespace().map(String::from).collect())
            }
            "view" | "v" => ShellCommand::View(arg()),
            "edit" | "e" => ShellCommand::Edit(arg()),
            "write" => ShellCommand::Write(unescape_newlines(rest)),
            "append" => ShellCommand::Append(unescape_newlines(rest)),
            "sidebar" => ShellCommand::Sidebar,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command: {} (try `help`)", other)),
        };
        Ok(Some(cmd))
    }
}

/// Lets a one-line `write` carry several blocks: `\n` becomes a newline.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

struct Shell {
    ctx: AppContext,
    mode_override: Option<SidebarMode>,
}

pub fn run<R: BufRead>(ctx: AppContext, input: R) -> Result<()> {
    let mut shell = Shell {
        ctx,
        mode_override: None,
    };
    shell.show_sidebar()?;

    let mut lines = input.lines();
    loop {
        shell.prompt()?;
        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.map_err(PagenoteError::Io)?;

        let cmd = match ShellCommand::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(usage) => {
                println!("{}", usage.red());
                continue;
            }
        };
        if cmd == ShellCommand::Quit {
            break;
        }
        if let Err(e) = shell.dispatch(cmd) {
            println!("{}", format!("Error: {}", e).red());
        }
    }

    shell.ctx.api.dispose()
}

impl Shell {
    fn prompt(&self) -> Result<()> {
        match self.ctx.api.title_draft() {
            Some(draft) => print!("pagenote [title: {}]> ", draft),
            None => print!("pagenote> "),
        }
        std::io::stdout().flush().map_err(PagenoteError::Io)
    }

    fn mode(&self) -> (SidebarMode, usize) {
        let width = terminal_width();
        let mode = self
            .mode_override
            .unwrap_or_else(|| SidebarMode::for_width(width, self.ctx.config.sidebar_breakpoint));
        (mode, width)
    }

    fn show_sidebar(&self) -> Result<()> {
        let result = self.ctx.api.list_pages()?;
        let (mode, width) = self.mode();
        print_sidebar(&result.listed_pages, mode, width);
        Ok(())
    }

    fn selected(&self) -> Result<String> {
        self.ctx
            .api
            .selected_page()
            .map(|p| p.id.to_string())
            .ok_or_else(|| PagenoteError::Api("No page is selected".to_string()))
    }

    fn blur_title(&mut self) -> Result<()> {
        if let Some(page) = self.ctx.api.release_focus()? {
            println!("{}", format!("Title saved: {}", page.title).green());
        }
        Ok(())
    }

    fn dispatch(&mut self, cmd: ShellCommand) -> Result<()> {
        if !matches!(cmd, ShellCommand::Title(_)) {
            self.blur_title()?;
        }

        match cmd {
            ShellCommand::List => self.show_sidebar()?,
            ShellCommand::Open(page) => {
                let result = self.ctx.api.select_page(&page)?;
                print_messages(&result.messages);
            }
            ShellCommand::New(title) => {
                let result = self.ctx.api.create_page(&title)?;
                print_messages(&result.messages);
                self.show_sidebar()?;
            }
            ShellCommand::Title(text) => {
                self.ctx.api.focus_title()?;
                if let Some(text) = text {
                    self.ctx.api.set_title_draft(&text)?;
                }
            }
            ShellCommand::Commit => {}
            ShellCommand::Delete(pages) => {
                let result = self.ctx.api.delete_pages(&pages)?;
                print_messages(&result.messages);
                self.show_sidebar()?;
            }
            ShellCommand::View(page) => {
                let page = match page {
                    Some(page) => page,
                    None => self.selected()?,
                };
                let result = self.ctx.api.view_pages(&[page])?;
                print_views(&result.views);
            }
            ShellCommand::Edit(page) => {
                let page = match page {
                    Some(page) => page,
                    None => self.selected()?,
                };
                self.edit_in_editor(&page)?;
            }
            ShellCommand::Write(text) => {
                let page = self.selected()?;
                let result = self.ctx.api.apply_edit(&page, EditAction::Replace(text))?;
                print_messages(&result.messages);
            }
            ShellCommand::Append(text) => {
                let page = self.selected()?;
                let result = self.ctx.api.apply_edit(&page, EditAction::Append(text))?;
                print_messages(&result.messages);
            }
            ShellCommand::Sidebar => {
                let (current, _) = self.mode();
                self.mode_override = Some(current.toggled());
                self.show_sidebar()?;
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => {}
        }
        Ok(())
    }

    fn edit_in_editor(&mut self, page: &str) -> Result<()> {
        let api = &mut self.ctx.api;
        let (_, buffer) = api.edit_buffer(page)?;

        // The editor owns the terminal from here on.
        if let Err(e) = api.flush(FlushReason::Blur) {
            warn!("Flush before launching editor failed: {}", e);
        }

        let edited = edit_buffer(&buffer, &self.ctx.config.file_ext)?;
        let result = api.apply_edit(page, EditAction::Replace(edited))?;
        print_messages(&result.messages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(ShellCommand::parse("   "), Ok(None));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(parse("open 2"), ShellCommand::Open("2".into()));
        assert_eq!(parse("new Road trip"), ShellCommand::New("Road trip".into()));
        assert_eq!(parse("new"), ShellCommand::New(String::new()));
        assert_eq!(parse("title"), ShellCommand::Title(None));
        assert_eq!(parse("title  Plans "), ShellCommand::Title(Some("Plans".into())));
        assert_eq!(
            parse("rm 1 3"),
            ShellCommand::Delete(vec!["1".into(), "3".into()])
        );
        assert_eq!(parse("q"), ShellCommand::Quit);
    }

    #[test]
    fn write_unescapes_newlines() {
        assert_eq!(
            parse("write # Plan\\n\\n- eat"),
            ShellCommand::Write("# Plan\n\n- eat".into())
        );
    }

    #[test]
    fn missing_arguments_are_reported() {
        assert!(ShellCommand::parse("open").is_err());
        assert!(ShellCommand::parse("rm").is_err());
        assert!(ShellCommand::parse("frobnicate").is_err());
    }
}
