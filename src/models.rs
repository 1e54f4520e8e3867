//! Data models for the search input and the articles collected from it.
//!
//! - [`SearchConfig`]: what to search for, built once per run
//! - [`NewsRecord`]: one extracted article, the unit written to the spreadsheet

use serde::{Deserialize, Serialize};

/// Sentinel stored in a text field when the value could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// The validated input of a run.
///
/// Built by [`crate::work_item::load_search_config`] and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Phrase typed into the site's search box. Never empty.
    pub search_phrase: String,
    /// Category filter label. Empty means no filter.
    pub category: String,
    /// Recency window in calendar months. Always at least 1.
    pub months: u32,
}

impl SearchConfig {
    /// Whether a category filter should be applied.
    pub fn has_category(&self) -> bool {
        !self.category.is_empty()
    }
}

/// One article taken from a results page.
///
/// Field order matches the spreadsheet column order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    pub title: String,
    pub description: String,
    /// `MM/DD/YYYY`, or `"N/A"` when the article carried no usable timestamp.
    pub date: String,
    /// Absolute path of the downloaded thumbnail, or `"N/A"`.
    pub picture_path: String,
    pub picture_filename: String,
    pub search_phrase_count: usize,
    pub contains_money: bool,
}

impl NewsRecord {
    /// Spreadsheet header row.
    pub const COLUMNS: [&'static str; 7] = [
        "title",
        "description",
        "date",
        "picture_path",
        "picture_filename",
        "search_phrase_count",
        "contains_money",
    ];
}

impl Default for NewsRecord {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            date: NOT_AVAILABLE.to_string(),
            picture_path: NOT_AVAILABLE.to_string(),
            picture_filename: NOT_AVAILABLE.to_string(),
            search_phrase_count: 0,
            contains_money: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_uses_sentinels() {
        let record = NewsRecord::default();
        assert_eq!(record.title, "N/A");
        assert_eq!(record.description, "N/A");
        assert_eq!(record.date, "N/A");
        assert_eq!(record.picture_path, "N/A");
        assert_eq!(record.picture_filename, "N/A");
        assert_eq!(record.search_phrase_count, 0);
        assert!(!record.contains_money);
    }

    #[test]
    fn test_columns_name_every_field() {
        let record = NewsRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.len(), NewsRecord::COLUMNS.len());
        for column in NewsRecord::COLUMNS {
            assert!(fields.contains_key(column), "missing column {column}");
        }
    }

    #[test]
    fn test_has_category() {
        let mut config = SearchConfig {
            search_phrase: "tariffs".to_string(),
            category: String::new(),
            months: 1,
        };
        assert!(!config.has_category());
        config.category = "Business".to_string();
        assert!(config.has_category());
    }
}
