//! Search & filter controller.
//!
//! Drives the site from its home page to a sorted, optionally filtered results
//! list. Only two outcomes are fatal: the search interaction itself failing and
//! the site answering "no results". The category filter and the sort order are
//! best-effort and degrade to warnings.

use crate::browser::{BrowserError, BrowserSession, ElementHandle};
use crate::config::Timeouts;
use crate::error::ScrapeError;
use crate::models::SearchConfig;
use crate::scrapers::SiteSelectors;
use tracing::{info, instrument, warn};

pub struct SearchController<'a> {
    search: &'a SearchConfig,
    selectors: &'a SiteSelectors,
    timeouts: &'a Timeouts,
}

impl<'a> SearchController<'a> {
    pub fn new(
        search: &'a SearchConfig,
        selectors: &'a SiteSelectors,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            search,
            selectors,
            timeouts,
        }
    }

    /// Submit the search, then apply the category filter and newest-first
    /// ordering.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::NoResults`] when the site found nothing for the phrase,
    /// [`ScrapeError::Browser`] when the search box or the results module
    /// never showed up.
    #[instrument(level = "info", skip_all, fields(phrase = %self.search.search_phrase, category = %self.search.category))]
    pub async fn search_and_filter<S: BrowserSession>(&self, session: &S) -> Result<(), ScrapeError> {
        self.submit_search(session).await?;

        if self.has_no_results(session).await? {
            return Err(ScrapeError::NoResults(self.search.search_phrase.clone()));
        }

        if self.search.has_category() {
            match self.filter_by_category(session).await {
                Ok(()) => info!("Category filter applied"),
                Err(e) => warn!(
                    category = %self.search.category,
                    error = %e,
                    "Category '{}' not found; continuing without the filter",
                    self.search.category
                ),
            }
        }

        match self.sort_by_newest(session).await {
            Ok(()) => info!("Results sorted by newest"),
            Err(e) => warn!(
                error = %e,
                "Option 'Newest' not found or could not be selected; keeping default order"
            ),
        }
        Ok(())
    }

    async fn submit_search<S: BrowserSession>(&self, session: &S) -> Result<(), BrowserError> {
        let sel = self.selectors;
        session
            .wait_until_visible(sel.search_button, self.timeouts.element())
            .await?;
        session.find(sel.search_button).await?.click().await?;

        session
            .wait_until_visible(sel.search_input, self.timeouts.element())
            .await?;
        let input = session.find(sel.search_input).await?;
        input.type_text(&self.search.search_phrase).await?;
        input.press_enter().await?;
        info!("Search submitted");
        Ok(())
    }

    async fn has_no_results<S: BrowserSession>(&self, session: &S) -> Result<bool, BrowserError> {
        session
            .wait_until_visible(self.selectors.results_module, self.timeouts.element())
            .await?;
        session.is_visible(self.selectors.no_results).await
    }

    /// Tick the checkbox whose label matches the category, ignoring case.
    async fn filter_by_category<S: BrowserSession>(&self, session: &S) -> Result<(), BrowserError> {
        let sel = self.selectors;
        let collapsible = session.is_visible(sel.filters_open_button).await?;
        if collapsible {
            session.find(sel.filters_open_button).await?.click().await?;
        }

        session
            .wait_until_visible(sel.category_option, self.timeouts.element())
            .await?;
        let wanted = self.search.category.to_lowercase();
        let mut matched = None;
        for option in session.find_all(sel.category_option).await? {
            if option.text().await?.to_lowercase() == wanted {
                matched = Some(option);
                break;
            }
        }
        let option = matched.ok_or_else(|| {
            BrowserError::NotFound(format!("category option '{}'", self.search.category))
        })?;
        option.click().await?;

        if collapsible {
            session
                .wait_until_visible(sel.apply_button, self.timeouts.element())
                .await?;
            session.find(sel.apply_button).await?.click().await?;
        }
        Ok(())
    }

    /// Pick "Newest" and wait for the listed articles to be re-rendered.
    async fn sort_by_newest<S: BrowserSession>(&self, session: &S) -> Result<(), BrowserError> {
        let sel = self.selectors;
        session
            .wait_until_visible(sel.sort_select, self.timeouts.element())
            .await?;
        let listed = session.find_all(sel.article).await.unwrap_or_default();
        session
            .select_option_by_text(sel.sort_select, sel.newest_option)
            .await?;
        for article in &listed {
            session.wait_until_stale(article, self.timeouts.stale()).await?;
        }
        Ok(())
    }
}
