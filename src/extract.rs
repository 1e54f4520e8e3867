//! Per-article field extraction and classification.
//!
//! Every extractor swallows its own lookup failures and falls back to a
//! sentinel (see [`NOT_AVAILABLE`]), so extracting an article never fails as a
//! whole. The only decision that leaves the extractor is the date window: an
//! article older than the configured number of months yields
//! [`ArticleOutcome::OutOfWindow`] and no record is built for it.
//!
//! | Field | Source | Sentinel |
//! |-------|--------|----------|
//! | date | timestamp attribute, epoch ms | `"N/A"` (kept) |
//! | title | title link text | `"N/A"` |
//! | description | description paragraph text | `"N/A"` |
//! | picture | image `src`, downloaded | `"N/A"`, `"N/A"` |

use crate::browser::{BrowserError, ElementHandle};
use crate::download::{DownloadError, ImageDownloader};
use crate::models::{NOT_AVAILABLE, NewsRecord, SearchConfig};
use crate::scrapers::SiteSelectors;
use crate::utils::image_filename;
use chrono::{DateTime, Datelike, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Dollar amounts: `$19.99`, `$20`, `1,000 dollars`, `20 USD`.
static MONEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\d+(\.\d{1,2})?|\d{1,3}(,\d{3})*(\.\d{2})? (dollars|usd)")
        .expect("money pattern is valid")
});

/// Result of reading an article's publication date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    /// Inside the window, formatted `MM/DD/YYYY`.
    Within(String),
    /// No usable timestamp; the article is kept with a `"N/A"` date.
    Unknown,
    /// Older than the window; extraction stops here.
    OutOfWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    Record(NewsRecord),
    OutOfWindow,
}

#[derive(Debug, Error)]
enum ImageError {
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("image has no src attribute")]
    MissingSource,
    #[error("invalid image URL: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Calendar months between two dates, ignoring the day of month.
///
/// Negative when `then` lies in a later month than `now`.
pub fn month_difference(now: &impl Datelike, then: &impl Datelike) -> i32 {
    (now.year() - then.year()) * 12 + (now.month() as i32 - then.month() as i32)
}

/// Parse an epoch-milliseconds timestamp into local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Local.timestamp_millis_opt(millis).single()
}

/// Case-insensitive, non-overlapping occurrences of `phrase` in the title
/// plus those in the description.
pub fn count_phrase(phrase: &str, title: &str, description: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    let phrase = phrase.to_lowercase();
    title.to_lowercase().matches(phrase.as_str()).count()
        + description.to_lowercase().matches(phrase.as_str()).count()
}

/// Whether the text mentions an amount of money.
///
/// Recall-oriented: amounts spelled out in words ("twenty dollars") are not
/// detected.
pub fn contains_money(text: &str) -> bool {
    MONEY_PATTERN.is_match(text)
}

/// Builds [`NewsRecord`]s from article elements.
pub struct ArticleExtractor<'a, D> {
    selectors: &'a SiteSelectors,
    search_phrase: &'a str,
    months: u32,
    base_url: Url,
    output_dir: PathBuf,
    downloader: D,
    now: DateTime<Local>,
}

impl<'a, D: ImageDownloader> ArticleExtractor<'a, D> {
    /// `output_dir` should be absolute; picture paths are reported as given.
    pub fn new(
        search: &'a SearchConfig,
        selectors: &'a SiteSelectors,
        base_url: Url,
        output_dir: PathBuf,
        downloader: D,
    ) -> Self {
        Self {
            selectors,
            search_phrase: &search.search_phrase,
            months: search.months,
            base_url,
            output_dir,
            downloader,
            now: Local::now(),
        }
    }

    /// Measure the date window from `now` instead of the construction time.
    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Extract every field of one article.
    pub async fn extract<E: ElementHandle>(&self, article: &E) -> ArticleOutcome {
        let date = match self.date(article).await {
            DateOutcome::OutOfWindow => return ArticleOutcome::OutOfWindow,
            DateOutcome::Within(date) => date,
            DateOutcome::Unknown => NOT_AVAILABLE.to_string(),
        };
        let title = self
            .text_of(article, self.selectors.article_title, "Title")
            .await;
        let description = self
            .text_of(article, self.selectors.article_description, "Description")
            .await;
        let (picture_path, picture_filename) = self.image(article, &title).await;

        ArticleOutcome::Record(NewsRecord {
            search_phrase_count: count_phrase(self.search_phrase, &title, &description),
            contains_money: contains_money(&title) || contains_money(&description),
            title,
            description,
            date,
            picture_path,
            picture_filename,
        })
    }

    /// Read the publication date and test it against the window.
    pub async fn date<E: ElementHandle>(&self, article: &E) -> DateOutcome {
        let raw = match article.find_child(self.selectors.article_timestamp).await {
            Ok(element) => element.attribute(self.selectors.timestamp_attribute).await,
            Err(e) => Err(e),
        };
        match raw {
            Ok(Some(raw)) => match parse_timestamp(&raw) {
                Some(date) => self.classify_date(&date),
                None => {
                    warn!(%raw, "Unparseable timestamp in article");
                    DateOutcome::Unknown
                }
            },
            Ok(None) => {
                warn!("Timestamp attribute missing in article");
                DateOutcome::Unknown
            }
            Err(e) => {
                warn!(error = %e, "Date not found in article");
                DateOutcome::Unknown
            }
        }
    }

    /// Apply the month window to a resolved date.
    pub fn classify_date(&self, date: &DateTime<Local>) -> DateOutcome {
        let diff = month_difference(&self.now, date);
        if i64::from(diff) >= i64::from(self.months) {
            debug!(%date, diff, months = self.months, "Article outside the date window");
            DateOutcome::OutOfWindow
        } else {
            DateOutcome::Within(date.format("%m/%d/%Y").to_string())
        }
    }

    async fn text_of<E: ElementHandle>(&self, article: &E, selector: &str, field: &str) -> String {
        let text = match article.find_child(selector).await {
            Ok(element) => element.text().await,
            Err(e) => Err(e),
        };
        text.unwrap_or_else(|e| {
            warn!(field, error = %e, "{field} not found in article");
            NOT_AVAILABLE.to_string()
        })
    }

    /// Download the article thumbnail. Returns `(path, filename)`.
    pub async fn image<E: ElementHandle>(&self, article: &E, title: &str) -> (String, String) {
        match self.download_image(article, title).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Image not found in article or failed to download");
                (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
            }
        }
    }

    async fn download_image<E: ElementHandle>(
        &self,
        article: &E,
        title: &str,
    ) -> Result<(String, String), ImageError> {
        let image = article.find_child(self.selectors.article_image).await?;
        let src = image
            .attribute("src")
            .await?
            .filter(|src| !src.trim().is_empty())
            .ok_or(ImageError::MissingSource)?;
        let url = self.base_url.join(src.trim())?;

        let filename = image_filename(title);
        let path = self.output_dir.join(&filename);
        self.downloader.download(&url, &path).await?;
        Ok((path.display().to_string(), filename))
    }
}
