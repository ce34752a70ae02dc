use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pagenote", bin_name = "pagenote", version)]
#[command(about = "Page-based notes with a sidebar, kept in a single slot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List pages in sidebar order
    #[command(alias = "ls")]
    List,

    /// Create a new page and select it
    #[command(alias = "n")]
    Create {
        /// Title words (empty for "Untitled")
        #[arg(num_args = 0..)]
        title: Vec<String>,
    },

    /// View one or more pages
    #[command(alias = "v")]
    View {
        /// Pages by position, id or title
        #[arg(required = true, num_args = 1..)]
        pages: Vec<String>,
    },

    /// Rename a page
    Rename {
        /// Page by position, id or title
        page: String,

        /// New title (empty for "Untitled")
        title: String,
    },

    /// Delete one or more pages
    #[command(alias = "rm")]
    Delete {
        /// Pages by position, id or title
        #[arg(required = true, num_args = 1..)]
        pages: Vec<String>,
    },

    /// Edit a page's content in the editor
    #[command(alias = "e")]
    Edit {
        /// Page by position, id or title
        page: String,

        /// Replace the content with this markdown instead of opening $EDITOR
        #[arg(long, conflicts_with = "append")]
        text: Option<String>,

        /// Append this markdown to the content
        #[arg(long)]
        append: Option<String>,
    },

    /// Export all pages to a tar.gz archive
    Export {
        /// Archive path (defaults to a timestamped name in the current directory)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (storage-key, sidebar-breakpoint, file-ext)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Interactive session with a live sidebar
    Shell,
}
