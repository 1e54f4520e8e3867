//! Command-line interface definitions.
//!
//! Every search input can come from the work item file, a flag, or an
//! environment variable. Flags and environment variables win over the work
//! item; runtime settings come from an optional YAML file and a few flags
//! applied on top of it.

use crate::config::Settings;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Work item read when `--work-item` is not given and this file exists.
pub const DEFAULT_WORK_ITEM: &str = "devdata/work-items.json";

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Everything from the default work item
/// latimes_news_bot
///
/// # Explicit search, no work item
/// latimes_news_bot --search-phrase tariffs --category Business --months 2
///
/// # Watch the browser and keep the output elsewhere
/// latimes_news_bot -w items.json -o /tmp/news --headed
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON work item holding search_phrase, category and months
    #[arg(short, long, env = "WORK_ITEM_PATH")]
    pub work_item: Option<PathBuf>,

    /// Phrase to search for (overrides the work item)
    #[arg(long, env = "SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// Category filter label (overrides the work item)
    #[arg(long, env = "CATEGORY")]
    pub category: Option<String>,

    /// Number of calendar months to collect, current month included
    /// (overrides the work item)
    #[arg(long, env = "MONTHS")]
    pub months: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for the spreadsheet and downloaded images
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub headed: bool,

    /// Exit with an error status when the run fails
    #[arg(long)]
    pub fail_on_error: bool,
}

impl Cli {
    /// The work item to read: the explicit path, else the default file if it
    /// exists.
    pub fn work_item_path(&self) -> Option<PathBuf> {
        match &self.work_item {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_WORK_ITEM);
                default.is_file().then(|| default.to_path_buf())
            }
        }
    }

    /// Apply the flags that override loaded settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if self.headed {
            settings.headless = false;
        }
    }
}
