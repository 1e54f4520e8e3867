//! Runtime settings for the browser and output locations.
//!
//! Settings come from an optional YAML file; every key is optional and falls
//! back to the defaults below. Command-line flags are applied on top by
//! [`crate::cli::Cli::apply_to`].
//!
//! ```yaml
//! site_url: https://www.latimes.com/
//! output_dir: output
//! headless: true
//! window_width: 1366
//! window_height: 768
//! screenshot: output/home.png
//! timeouts:
//!   element_secs: 10
//!   stale_secs: 30
//! ```

use crate::error::ScrapeError;
use crate::scrapers::latimes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Home page the search starts from.
    pub site_url: String,
    /// Directory receiving the spreadsheet and downloaded images.
    pub output_dir: PathBuf,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Where to save a screenshot of the home page, if anywhere.
    pub screenshot: Option<PathBuf>,
    pub timeouts: Timeouts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: latimes::HOME_URL.to_string(),
            output_dir: PathBuf::from("output"),
            headless: true,
            window_width: 1366,
            window_height: 768,
            screenshot: None,
            timeouts: Timeouts::default(),
        }
    }
}

/// Bounds on the polling waits, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Timeouts {
    /// Waiting for an element to become visible.
    pub element_secs: u64,
    /// Waiting for a re-rendered element to go stale.
    pub stale_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_secs: 10,
            stale_secs: 30,
        }
    }
}

impl Timeouts {
    pub fn element(&self) -> Duration {
        Duration::from_secs(self.element_secs)
    }

    pub fn stale(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }
}

impl Settings {
    /// Parse settings from YAML text. Blank text yields the defaults.
    pub fn from_yaml(text: &str) -> Result<Self, ScrapeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ScrapeError> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let text = fs::read_to_string(path).await?;
                let settings = Self::from_yaml(&text)?;
                info!(path, "Loaded settings");
                Ok(settings)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.site_url, "https://www.latimes.com/");
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert!(settings.headless);
        assert_eq!(settings.timeouts.element(), Duration::from_secs(10));
        assert_eq!(settings.timeouts.stale(), Duration::from_secs(30));
    }

    #[test]
    fn test_blank_yaml_uses_defaults() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
output_dir: /tmp/news
headless: false
timeouts:
  element_secs: 5
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/news"));
        assert!(!settings.headless);
        assert_eq!(settings.timeouts.element_secs, 5);
        assert_eq!(settings.timeouts.stale_secs, 30);
        assert_eq!(settings.site_url, latimes::HOME_URL);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = Settings::from_yaml("headless: [not, a, bool]").unwrap_err();
        assert!(matches!(err, ScrapeError::Settings(_)));
    }

    #[tokio::test]
    async fn test_load_without_path() {
        assert_eq!(Settings::load(None).await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.yaml");
        std::fs::write(&path, "window_width: 800\n").unwrap();
        let settings = Settings::load(path.to_str()).await.unwrap();
        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, 768);
    }
}
