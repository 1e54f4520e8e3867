//! In-memory browser over static HTML pages, for tests.
//!
//! A [`FixtureSession`] starts on a home page and knows a list of results
//! pages. Pressing Enter in any element submits the search and shows the first
//! results page (or the configured "no results" page). Clicking the site's
//! next-page link moves to the following results page. Every navigation or
//! re-render bumps a generation counter; handles created under an older
//! generation report themselves stale and refuse further operations.

use super::{BrowserError, BrowserSession, ElementHandle};
use crate::scrapers::latimes::SELECTORS;
use scraper::{ElementRef, Html, Selector};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Default)]
struct State {
    home: String,
    results: Vec<String>,
    no_results: Option<String>,
    page: Option<usize>,
    document: String,
    generation: u64,
    reflow_selector: Option<String>,
    actions: Vec<String>,
    quit: bool,
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::Script(format!("invalid selector '{selector}': {e:?}")))
}

fn stale_error() -> BrowserError {
    BrowserError::Script("stale element reference".to_string())
}

/// The element a fragment was parsed from (fragments are wrapped in `<html>`).
fn fragment_root(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment.root_element().children().find_map(ElementRef::wrap)
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl State {
    fn select(&self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let document = Html::parse_document(&self.document);
        let selector = parse_selector(selector)?;
        let found: Vec<String> = document.select(&selector).map(|e| e.html()).collect();
        Ok(found)
    }

    fn navigate(&mut self, html: String) {
        self.document = html;
        self.generation += 1;
    }

    fn click(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        self.actions.push(format!("click {selector} [{text}]"));
        if selector == SELECTORS.next_page {
            let next = self.page.map_or(0, |page| page + 1);
            let html = self
                .results
                .get(next)
                .cloned()
                .ok_or_else(|| BrowserError::NotFound("next results page".to_string()))?;
            self.page = Some(next);
            self.navigate(html);
        }
        Ok(())
    }

    fn submit(&mut self) {
        self.actions.push("submit".to_string());
        match self.no_results.clone() {
            Some(html) => self.navigate(html),
            None => {
                self.page = Some(0);
                let html = self.results.first().cloned().unwrap_or_default();
                self.navigate(html);
            }
        }
    }
}

/// A scripted browser tab.
pub struct FixtureSession {
    state: Rc<RefCell<State>>,
}

/// Read access to a session's recorded state after it has been consumed.
#[derive(Clone)]
pub struct FixtureProbe(Rc<RefCell<State>>);

impl FixtureSession {
    pub fn new(home: &str, results: Vec<String>) -> Self {
        let state = State {
            home: home.to_string(),
            results,
            ..State::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Answer the search with `html` instead of the results pages.
    pub fn with_no_results(self, html: &str) -> Self {
        self.state.borrow_mut().no_results = Some(html.to_string());
        self
    }

    /// Re-render the page once, right after the first listing of `selector`.
    pub fn with_reflow_on(self, selector: &str) -> Self {
        self.state.borrow_mut().reflow_selector = Some(selector.to_string());
        self
    }

    pub fn probe(&self) -> FixtureProbe {
        FixtureProbe(Rc::clone(&self.state))
    }

    fn element(&self, html: String, selector: &str, generation: u64) -> FixtureElement {
        FixtureElement {
            html,
            selector: selector.to_string(),
            generation,
            state: Rc::clone(&self.state),
        }
    }
}

impl FixtureProbe {
    pub fn actions(&self) -> Vec<String> {
        self.0.borrow().actions.clone()
    }

    pub fn clicked(&self, selector: &str) -> bool {
        let prefix = format!("click {selector} ");
        self.0.borrow().actions.iter().any(|a| a.starts_with(&prefix))
    }

    pub fn quit_called(&self) -> bool {
        self.0.borrow().quit
    }

    /// Index of the results page on display.
    pub fn page(&self) -> Option<usize> {
        self.0.borrow().page
    }
}

impl BrowserSession for FixtureSession {
    type Element = FixtureElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.borrow_mut();
        state.actions.push(format!("goto {url}"));
        state.page = None;
        let home = state.home.clone();
        state.navigate(home);
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<FixtureElement, BrowserError> {
        let (html, generation) = {
            let state = self.state.borrow();
            let html = state
                .select(selector)?
                .into_iter()
                .next()
                .ok_or_else(|| BrowserError::NotFound(selector.to_string()))?;
            (html, state.generation)
        };
        Ok(self.element(html, selector, generation))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FixtureElement>, BrowserError> {
        let (found, generation) = {
            let state = self.state.borrow();
            (state.select(selector)?, state.generation)
        };
        let elements: Vec<FixtureElement> = found
            .into_iter()
            .map(|html| self.element(html, selector, generation))
            .collect();

        let mut state = self.state.borrow_mut();
        if state.reflow_selector.as_deref() == Some(selector) {
            state.reflow_selector = None;
            state.generation += 1;
        }
        Ok(elements)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError> {
        Ok(!self.state.borrow().select(selector)?.is_empty())
    }

    async fn select_option_by_text(
        &self,
        select_selector: &str,
        option_text: &str,
    ) -> Result<(), BrowserError> {
        let found = {
            let state = self.state.borrow();
            let document = Html::parse_document(&state.document);
            let options = parse_selector(&format!("{select_selector} option"))?;
            let found = document
                .select(&options)
                .any(|option| normalized_text(option) == option_text);
            found
        };
        if !found {
            return Err(BrowserError::NotFound(format!(
                "option '{option_text}' in '{select_selector}'"
            )));
        }
        let mut state = self.state.borrow_mut();
        state.actions.push(format!("select {option_text}"));
        state.generation += 1;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.state
            .borrow_mut()
            .actions
            .push(format!("screenshot {}", path.display()));
        Ok(())
    }

    async fn quit(self) -> Result<(), BrowserError> {
        self.state.borrow_mut().quit = true;
        Ok(())
    }
}

/// A located fixture element: its outer HTML plus the generation it was
/// found under.
pub struct FixtureElement {
    html: String,
    selector: String,
    generation: u64,
    state: Rc<RefCell<State>>,
}

impl FixtureElement {
    /// An element that belongs to no session and never goes stale.
    pub fn detached(html: &str) -> Self {
        Self {
            html: html.to_string(),
            selector: String::new(),
            generation: 0,
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    fn is_stale_now(&self) -> bool {
        self.state.borrow().generation != self.generation
    }

    fn ensure_fresh(&self) -> Result<(), BrowserError> {
        if self.is_stale_now() {
            Err(stale_error())
        } else {
            Ok(())
        }
    }
}

impl ElementHandle for FixtureElement {
    async fn find_child(&self, selector: &str) -> Result<Self, BrowserError> {
        self.ensure_fresh()?;
        let fragment = Html::parse_fragment(&self.html);
        let parsed = parse_selector(selector)?;
        let html = fragment
            .select(&parsed)
            .next()
            .map(|e| e.html())
            .ok_or_else(|| BrowserError::NotFound(selector.to_string()))?;
        Ok(Self {
            html,
            selector: selector.to_string(),
            generation: self.generation,
            state: Rc::clone(&self.state),
        })
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.ensure_fresh()?;
        let fragment = Html::parse_fragment(&self.html);
        let value = fragment_root(&fragment)
            .and_then(|e| e.value().attr(name))
            .map(str::to_string);
        Ok(value)
    }

    async fn text(&self) -> Result<String, BrowserError> {
        self.ensure_fresh()?;
        let fragment = Html::parse_fragment(&self.html);
        let text = fragment_root(&fragment)
            .map(normalized_text)
            .unwrap_or_default();
        Ok(text)
    }

    async fn is_stale(&self) -> bool {
        self.is_stale_now()
    }

    async fn click(&self) -> Result<(), BrowserError> {
        let text = self.text().await?;
        self.state.borrow_mut().click(&self.selector, &text)
    }

    async fn type_text(&self, text: &str) -> Result<(), BrowserError> {
        self.ensure_fresh()?;
        self.state.borrow_mut().actions.push(format!("type {text}"));
        Ok(())
    }

    async fn press_enter(&self) -> Result<(), BrowserError> {
        self.ensure_fresh()?;
        self.state.borrow_mut().submit();
        Ok(())
    }
}

/// HTML builders shared by the scraping tests.
pub mod pages {
    use chrono::{DateTime, Local};

    pub const HOME: &str = r#"<html><body>
        <button data-element="search-button">Search</button>
        <input data-element="search-form-input" type="text">
    </body></html>"#;

    pub const NO_RESULTS: &str = r#"<html><body>
        <div class="search-results-module-ajax">
            <div class="search-results-module-no-results">There are no results.</div>
        </div>
    </body></html>"#;

    /// One result card.
    pub fn article(title: &str, description: &str, published: DateTime<Local>) -> String {
        format!(
            r#"<div class="promo-wrapper">
                <div class="promo-media"><img src="/img/{slug}.jpg"></div>
                <div class="promo-content">
                    <h3 class="promo-title"><a href="/story/{slug}">{title}</a></h3>
                    <p class="promo-description">{description}</p>
                    <p class="promo-timestamp" data-timestamp="{ts}">{date}</p>
                </div>
            </div>"#,
            slug = title.len(),
            ts = published.timestamp_millis(),
            date = published.format("%B %-d, %Y"),
        )
    }

    /// A results page with filter panel, sort control and the given cards.
    pub fn results(categories: &[&str], articles: &[String], has_next: bool) -> String {
        let checkboxes: String = categories
            .iter()
            .map(|c| {
                format!(
                    r#"<label class="checkbox-input-label"><input type="checkbox"><span>{c}</span></label>"#
                )
            })
            .collect();
        let next = if has_next {
            r#"<div class="search-results-module-next-page"><a href="?p=2" rel="nofollow">Next</a></div>"#
        } else {
            ""
        };
        format!(
            r#"<html><body>
            <div class="search-results-module-ajax">
                <button class="button filters-open-button">Filters</button>
                <div class="filters">{checkboxes}
                    <button class="button apply-button">Apply</button>
                </div>
                <select class="select-input">
                    <option value="0">Relevance</option>
                    <option value="1">Newest</option>
                </select>
                <div class="search-results-module-results-menu">{cards}</div>
                {next}
            </div>
            </body></html>"#,
            cards = articles.concat(),
        )
    }
}
