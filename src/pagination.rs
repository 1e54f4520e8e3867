//! Pagination and extraction loop.
//!
//! Walks the results pages in order and turns each article into a
//! [`NewsRecord`]. The walk ends at the first of:
//!
//! 1. an article older than the date window (it and everything after it are
//!    dropped),
//! 2. a page without a usable next-page link,
//! 3. a page whose article list cannot be located.
//!
//! None of these is an error: the loop always returns what it has collected.
//! Articles are processed strictly in document order, so the date cutoff on a
//! page wins over that page's next-page link.

use crate::browser::{BrowserError, BrowserSession, ElementHandle};
use crate::config::Timeouts;
use crate::download::ImageDownloader;
use crate::error::ScrapeError;
use crate::extract::{ArticleExtractor, ArticleOutcome};
use crate::models::NewsRecord;
use crate::scrapers::SiteSelectors;
use crate::utils::truncate_for_log;
use tracing::{debug, info, instrument, warn};

/// How processing of one results page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// Every article on the page was processed.
    Exhausted,
    /// An article fell outside the date window.
    ReachedCutoff,
}

pub struct NewsCollector<'a, D> {
    selectors: &'a SiteSelectors,
    timeouts: &'a Timeouts,
    extractor: ArticleExtractor<'a, D>,
}

impl<'a, D: ImageDownloader> NewsCollector<'a, D> {
    pub fn new(
        selectors: &'a SiteSelectors,
        timeouts: &'a Timeouts,
        extractor: ArticleExtractor<'a, D>,
    ) -> Self {
        Self {
            selectors,
            timeouts,
            extractor,
        }
    }

    /// Collect records from the current results page onwards.
    #[instrument(level = "info", skip_all)]
    pub async fn collect<S: BrowserSession>(&self, session: &S) -> Vec<NewsRecord> {
        let mut records = Vec::new();
        let mut page = 1usize;

        loop {
            let articles = match self.list_articles(session).await {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(page, error = %e, "Failed to find articles; returning what was collected");
                    break;
                }
            };
            info!(page, count = articles.len(), "Reading results page");

            if self.process_page(session, articles, &mut records).await == PageOutcome::ReachedCutoff {
                info!(page, "Reached the date window cutoff");
                break;
            }

            match self.goto_next_page(session).await {
                Ok(()) => page += 1,
                Err(e) => {
                    info!(page, reason = %e, "No further results pages");
                    break;
                }
            }
        }

        info!(pages = page, records = records.len(), "Finished collecting articles");
        records
    }

    async fn list_articles<S: BrowserSession>(&self, session: &S) -> Result<Vec<S::Element>, BrowserError> {
        session
            .wait_until_visible(self.selectors.article, self.timeouts.element())
            .await?;
        session.find_all(self.selectors.article).await
    }

    async fn process_page<S: BrowserSession>(
        &self,
        session: &S,
        articles: Vec<S::Element>,
        records: &mut Vec<NewsRecord>,
    ) -> PageOutcome {
        for (index, article) in articles.into_iter().enumerate() {
            let article = if article.is_stale().await {
                debug!(index, "Article handle went stale; locating it again");
                match self.reacquire(session, index).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        warn!(index, error = %e, "Failed to process article");
                        continue;
                    }
                }
            } else {
                article
            };

            match self.extractor.extract(&article).await {
                ArticleOutcome::Record(record) => {
                    debug!(index, title = %truncate_for_log(&record.title, 80), "Collected article");
                    records.push(record);
                }
                ArticleOutcome::OutOfWindow => return PageOutcome::ReachedCutoff,
            }
        }
        PageOutcome::Exhausted
    }

    /// Locate the `index`-th article of the current page afresh.
    async fn reacquire<S: BrowserSession>(&self, session: &S, index: usize) -> Result<S::Element, BrowserError> {
        session
            .wait_until_visible(self.selectors.article, self.timeouts.stale())
            .await?;
        session
            .find_all(self.selectors.article)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| BrowserError::NotFound(format!("article #{index} after re-render")))
    }

    /// Click the next-page link and wait for the current list to be replaced.
    async fn goto_next_page<S: BrowserSession>(&self, session: &S) -> Result<(), ScrapeError> {
        let sel = self.selectors;
        session
            .wait_until_visible(sel.next_page, self.timeouts.element())
            .await
            .map_err(ScrapeError::PageNavigation)?;

        let marker = session.find(sel.article).await.ok();
        session
            .find(sel.next_page)
            .await
            .map_err(ScrapeError::PageNavigation)?
            .click()
            .await
            .map_err(ScrapeError::PageNavigation)?;

        if let Some(marker) = marker {
            if let Err(e) = session.wait_until_stale(&marker, self.timeouts.stale()).await {
                warn!(error = %e, "Previous results still displayed after clicking next page");
            }
        }
        Ok(())
    }
}
