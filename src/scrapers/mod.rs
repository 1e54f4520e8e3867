//! Site definitions.
//!
//! The scraping core never hard-codes markup. Everything it needs to know
//! about a site's pages is a [`SiteSelectors`] value, so supporting another
//! site means adding a module with its own value rather than editing the
//! controller or the pagination loop.
//!
//! | Site | Module | Home page |
//! |------|--------|-----------|
//! | Los Angeles Times | [`latimes`] | `https://www.latimes.com/` |

pub mod latimes;

/// CSS selectors (and the few literal labels) describing a news site's
/// search flow and results markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteSelectors {
    /// Button revealing the search box.
    pub search_button: &'static str,
    pub search_input: &'static str,
    /// Container rendered once the search has been answered.
    pub results_module: &'static str,
    /// Indicator shown inside the results module when nothing matched.
    pub no_results: &'static str,
    /// Button expanding a collapsed filter panel.
    pub filters_open_button: &'static str,
    /// Text-bearing part of each category checkbox.
    pub category_option: &'static str,
    pub apply_button: &'static str,
    pub sort_select: &'static str,
    /// Label of the sort option putting the newest articles first.
    pub newest_option: &'static str,
    /// One repeated result entry.
    pub article: &'static str,
    /// Article-scoped element carrying the publication time.
    pub article_timestamp: &'static str,
    /// Attribute holding the publication time in epoch milliseconds.
    pub timestamp_attribute: &'static str,
    pub article_title: &'static str,
    pub article_description: &'static str,
    pub article_image: &'static str,
    pub next_page: &'static str,
}
