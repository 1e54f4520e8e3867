//! # LA Times News Bot
//!
//! Searches the Los Angeles Times for a phrase, collects the articles published
//! within a recent window of calendar months and saves them to a spreadsheet,
//! together with each article's thumbnail.
//!
//! ## Usage
//!
//! ```sh
//! latimes_news_bot --search-phrase tariffs --category Business --months 2
//! ```
//!
//! ## Architecture
//!
//! One browser session, driven sequentially:
//! 1. **Search**: submit the phrase, apply the category filter, sort by newest
//! 2. **Collect**: walk the results pages, extracting each article until one
//!    falls outside the date window or the pages run out
//! 3. **Output**: write `news_<phrase>.xlsx` next to the downloaded images
//!
//! The browser is closed on every path once it has been launched.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod browser;
mod cli;
mod config;
mod download;
mod error;
mod extract;
mod models;
mod outputs;
mod pagination;
mod scrapers;
mod search;
mod utils;
mod work_item;

use browser::BrowserSession;
use browser::chrome::ChromeSession;
use cli::Cli;
use config::Settings;
use download::{HttpDownloader, ImageDownloader};
use error::ScrapeError;
use extract::ArticleExtractor;
use models::{NewsRecord, SearchConfig};
use outputs::xlsx;
use pagination::NewsCollector;
use scrapers::latimes;
use search::SearchController;
use utils::ensure_writable_dir;
use work_item::{CATEGORY, MONTHS, SEARCH_PHRASE, WorkItemData};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("latimes_news_bot starting up");

    let args = Cli::parse();
    debug!(?args.work_item, ?args.config, ?args.output_dir, "Parsed CLI arguments");

    match run(&args).await {
        Ok(Some(path)) => info!(path = %path.display(), "Spreadsheet written"),
        Ok(None) => info!("No articles collected; no spreadsheet written"),
        Err(e) => {
            error!(error = %e, "Run failed");
            if args.fail_on_error {
                return Err(e.into());
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Load inputs, scrape with a real browser and write the spreadsheet.
#[instrument(level = "info", skip_all)]
async fn run(args: &Cli) -> Result<Option<PathBuf>, ScrapeError> {
    let mut settings = Settings::load(args.config.as_deref()).await?;
    args.apply_to(&mut settings);
    let search = load_search(args).await?;

    // Fail before launching the browser if nothing could be saved.
    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }
    let output_dir = std::path::absolute(&settings.output_dir)?;
    let base_url = Url::parse(&settings.site_url)?;
    let downloader = HttpDownloader::new()?;

    let session = ChromeSession::launch(&settings).await?;
    let records = run_session(session, &settings, &search, base_url, output_dir.clone(), downloader).await?;

    xlsx::write_news(&records, &search.search_phrase, &output_dir)
}

/// Merge the work item with command-line values and validate the result.
async fn load_search(args: &Cli) -> Result<SearchConfig, ScrapeError> {
    let mut data = match args.work_item_path() {
        Some(path) => work_item::read_work_item(&path).await?,
        None => {
            info!("No work item file; using command-line values only");
            WorkItemData::new()
        }
    };
    work_item::with_override(&mut data, SEARCH_PHRASE, args.search_phrase.as_deref());
    work_item::with_override(&mut data, CATEGORY, args.category.as_deref());
    work_item::with_override(&mut data, MONTHS, args.months.as_deref());
    work_item::load_search_config(&data)
}

/// Scrape with `session`, then close it whatever the outcome.
async fn run_session<S: BrowserSession, D: ImageDownloader>(
    session: S,
    settings: &Settings,
    search: &SearchConfig,
    base_url: Url,
    output_dir: PathBuf,
    downloader: D,
) -> Result<Vec<NewsRecord>, ScrapeError> {
    let scraped = scrape(&session, settings, search, base_url, output_dir, downloader).await;
    match session.quit().await {
        Ok(()) => info!("Browser closed"),
        Err(e) => warn!(error = %e, "Failed to close the browser cleanly"),
    }
    scraped
}

async fn scrape<S: BrowserSession, D: ImageDownloader>(
    session: &S,
    settings: &Settings,
    search: &SearchConfig,
    base_url: Url,
    output_dir: PathBuf,
    downloader: D,
) -> Result<Vec<NewsRecord>, ScrapeError> {
    session.goto(base_url.as_str()).await?;
    info!(url = %base_url, "Opened site");

    if let Some(path) = &settings.screenshot {
        match session.screenshot(path).await {
            Ok(()) => info!(path = %path.display(), "Saved home page screenshot"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to save screenshot"),
        }
    }

    let selectors = &latimes::SELECTORS;
    SearchController::new(search, selectors, &settings.timeouts)
        .search_and_filter(session)
        .await?;

    let extractor = ArticleExtractor::new(search, selectors, base_url, output_dir, downloader);
    let records = NewsCollector::new(selectors, &settings.timeouts, extractor)
        .collect(session)
        .await;
    info!(count = records.len(), "Collected news records");
    Ok(records)
}
