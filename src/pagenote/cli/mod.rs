//! # CLI Layer
//!
//! One possible UI client for pagenote. This is the only place that knows
//! about stdout, exit codes, terminal width and `$EDITOR`.
//!
//! - `run()`: parses arguments, sets up logging and dispatches
//! - `init_context()`: resolves the data directory, loads config, opens the API
//! - `handle_*()`: per-command handlers that call the API and print results
//! - [`shell`]: the interactive session
//!
//! One-shot commands persist through their own mutations; only the shell
//! performs an unload flush when it exits.

mod args;
mod render;
mod shell;

use args::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use env_logger::Env;
use log::debug;
use pagenote::api::{ConfigAction, EditAction, PagenoteApi};
use pagenote::config::{PagenoteConfig, CONFIG_KEYS};
use pagenote::editor::external::edit_buffer;
use pagenote::error::{PagenoteError, Result};
use pagenote::store::fs_backend::FsBackend;
use render::{print_messages, print_sidebar, print_views, terminal_width, SidebarMode};
use std::env;
use std::path::PathBuf;

/// Overrides the platform data directory.
pub const HOME_ENV: &str = "PAGENOTE_HOME";

pub struct AppContext {
    pub api: PagenoteApi<FsBackend>,
    pub config: PagenoteConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::Create { title }) => handle_create(&mut ctx, title.join(" ")),
        Some(Commands::View { pages }) => handle_view(&ctx, pages),
        Some(Commands::Rename { page, title }) => handle_rename(&mut ctx, page, title),
        Some(Commands::Delete { pages }) => handle_delete(&mut ctx, pages),
        Some(Commands::Edit { page, text, append }) => handle_edit(&mut ctx, page, text, append),
        Some(Commands::Export { output }) => handle_export(&ctx, output),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        Some(Commands::Shell) => shell::run(ctx, std::io::stdin().lock()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "pagenote", "pagenote")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PagenoteError::Api("Could not determine data directory".to_string()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    debug!("Using data directory {}", data_dir.display());

    let config = PagenoteConfig::load(&data_dir)?;
    let backend = FsBackend::new(data_dir.clone());
    let api = PagenoteApi::open(backend, &config.storage_key, data_dir)?;

    Ok(AppContext { api, config })
}

fn sidebar_mode(ctx: &AppContext) -> (SidebarMode, usize) {
    let width = terminal_width();
    (SidebarMode::for_width(width, ctx.config.sidebar_breakpoint), width)
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_pages()?;
    let (mode, width) = sidebar_mode(ctx);
    print_sidebar(&result.listed_pages, mode, width);
    print_messages(&result.messages);
    Ok(())
}

fn handle_create(ctx: &mut AppContext, title: String) -> Result<()> {
    let result = ctx.api.create_page(&title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &AppContext, pages: Vec<String>) -> Result<()> {
    let result = ctx.api.view_pages(&pages)?;
    print_views(&result.views);
    print_messages(&result.messages);
    Ok(())
}

fn handle_rename(ctx: &mut AppContext, page: String, title: String) -> Result<()> {
    let result = ctx.api.rename_page(&page, &title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, pages: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_pages(&pages)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    page: String,
    text: Option<String>,
    append: Option<String>,
) -> Result<()> {
    let action = match (text, append) {
        (Some(text), _) => EditAction::Replace(text),
        (None, Some(extra)) => EditAction::Append(extra),
        (None, None) => {
            let (_, buffer) = ctx.api.edit_buffer(&page)?;
            EditAction::Replace(edit_buffer(&buffer, &ctx.config.file_ext)?)
        }
    };
    let result = ctx.api.apply_edit(&page, action)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, output: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export(output)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in CONFIG_KEYS {
                if let Some(value) = config.get(key) {
                    println!("{} = {}", key, value);
                }
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}
