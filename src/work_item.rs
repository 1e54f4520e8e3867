//! Loading the search input from a work item.
//!
//! A work item is a JSON document holding `search_phrase`, `category` and
//! `months`. Three layouts are accepted:
//!
//! ```json
//! {"search_phrase": "tariffs", "category": "Business", "months": 2}
//! {"payload": {"search_phrase": "tariffs"}}
//! [{"payload": {"search_phrase": "tariffs"}}]
//! ```
//!
//! Values given on the command line are merged over the file with
//! [`with_override`] and go through the same coercion rules.

use crate::error::ScrapeError;
use crate::models::SearchConfig;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// The key/value variables of one work item.
pub type WorkItemData = Map<String, Value>;

pub const SEARCH_PHRASE: &str = "search_phrase";
pub const CATEGORY: &str = "category";
pub const MONTHS: &str = "months";

/// Parse work item JSON into its variables.
pub fn parse_work_item(text: &str) -> Result<WorkItemData, ScrapeError> {
    let value: Value = serde_json::from_str(text)?;
    let item = match value {
        Value::Array(items) => items.into_iter().next().ok_or_else(|| {
            ScrapeError::WorkItem("the work item list is empty".to_string())
        })?,
        other => other,
    };
    match item {
        Value::Object(mut object) => match object.remove("payload") {
            Some(Value::Object(payload)) => Ok(payload),
            Some(other) => {
                object.insert("payload".to_string(), other);
                Ok(object)
            }
            None => Ok(object),
        },
        _ => Err(ScrapeError::WorkItem(
            "expected a JSON object of variables".to_string(),
        )),
    }
}

/// Read and parse a work item file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_work_item(path: &Path) -> Result<WorkItemData, ScrapeError> {
    let text = fs::read_to_string(path).await?;
    let data = parse_work_item(&text)?;
    info!(keys = data.len(), "Loaded work item");
    Ok(data)
}

/// Replace `key` with a command-line value, when one was given.
pub fn with_override(data: &mut WorkItemData, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        data.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Validate and coerce the work item variables into a [`SearchConfig`].
///
/// # Errors
///
/// Fails only when `search_phrase` is missing or blank. A bad `category` or
/// `months` is logged and replaced by its default.
pub fn load_search_config(data: &WorkItemData) -> Result<SearchConfig, ScrapeError> {
    let config = SearchConfig {
        search_phrase: search_phrase(data)?,
        category: category(data),
        months: months(data),
    };
    info!(
        search_phrase = %config.search_phrase,
        category = %config.category,
        months = config.months,
        "Search configuration loaded"
    );
    Ok(config)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn search_phrase(data: &WorkItemData) -> Result<String, ScrapeError> {
    data.get(SEARCH_PHRASE)
        .and_then(as_text)
        .filter(|phrase| !phrase.is_empty())
        .ok_or_else(|| {
            ScrapeError::WorkItem(format!(
                "The '{SEARCH_PHRASE}' is mandatory and was not provided in the work item."
            ))
        })
}

fn category(data: &WorkItemData) -> String {
    match data.get(CATEGORY).and_then(as_text) {
        Some(category) if !category.is_empty() => category,
        _ => {
            warn!("The '{CATEGORY}' was not provided in the work item.");
            String::new()
        }
    }
}

fn months(data: &WorkItemData) -> u32 {
    let raw = match data.get(MONTHS) {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    match raw {
        None => {
            warn!("The '{MONTHS}' is not a valid integer in the work item, defaulting to 1.");
            1
        }
        Some(m) if m < 0 => {
            warn!("The '{MONTHS}' provided is less than 0. Defaulting to 1.");
            1
        }
        Some(0) => 1,
        Some(m) => u32::try_from(m).unwrap_or(u32::MAX),
    }
}
