//! Error types for the scraping run.
//!
//! [`ScrapeError`] is the closed set of failures the controller, the
//! pagination loop and the top-level run branch on. Browser and download
//! failures have their own enums in [`crate::browser`] and [`crate::download`].

use crate::browser::BrowserError;
use thiserror::Error;

/// Errors that can end (or shorten) a scraping run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The site reported no results; terminal for the run.
    #[error("No results found for the search phrase '{0}'")]
    NoResults(String),

    /// The next results page could not be reached.
    #[error("Could not navigate to the next results page: {0}")]
    PageNavigation(#[source] BrowserError),

    /// The work item is missing a mandatory value or could not be parsed.
    #[error("Invalid work item: {0}")]
    WorkItem(String),

    /// The YAML settings file could not be parsed.
    #[error("Invalid settings file: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// The work item file is not valid JSON.
    #[error("Work item is not valid JSON: {0}")]
    WorkItemJson(#[from] serde_json::Error),

    /// A browser interaction the run cannot continue without failed.
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The configured site URL does not parse.
    #[error("Invalid site URL: {0}")]
    SiteUrl(#[from] url::ParseError),

    /// The HTTP client for image downloads could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The spreadsheet could not be written.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}
