//! Los Angeles Times search pages.
//!
//! The search box lives behind a header button on the home page. Results are
//! rendered as `div.promo-wrapper` cards with a filter panel
//! (collapsed on narrow viewports) and a sort dropdown above them.

use super::SiteSelectors;

pub const HOME_URL: &str = "https://www.latimes.com/";

pub const SELECTORS: SiteSelectors = SiteSelectors {
    search_button: "button[data-element='search-button']",
    search_input: "input[data-element='search-form-input']",
    results_module: "div.search-results-module-ajax",
    no_results: "div.search-results-module-no-results",
    filters_open_button: ".button.filters-open-button",
    category_option: "label.checkbox-input-label span",
    apply_button: ".button.apply-button",
    sort_select: "select.select-input",
    newest_option: "Newest",
    article: "div[class='promo-wrapper']",
    article_timestamp: "p[data-timestamp]",
    timestamp_attribute: "data-timestamp",
    article_title: "h3.promo-title a",
    article_description: "p.promo-description",
    article_image: "div.promo-media img",
    next_page: "div.search-results-module-next-page a[rel='nofollow']",
};
