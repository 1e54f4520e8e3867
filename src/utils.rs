//! String helpers for file naming and logging, plus output directory checks.

use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` characters are cut and suffixed with the number
/// of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Turn an article title into the stem of its image filename.
///
/// Lowercases, drops every character that is not an ASCII letter, an ASCII
/// digit or whitespace, then replaces each space with a hyphen. Runs of
/// removed characters are not collapsed, so `"a & b"` becomes `"a--b"`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Tariffs & Trade: 2024!"), "tariffs--trade-2024");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric() && !c.is_whitespace(), "")
        .replace(' ', "-")
}

/// Filename of the thumbnail downloaded for an article.
pub fn image_filename(title: &str) -> String {
    format!("{}.png", slugify_title(title))
}

/// Lowercase the search phrase and hyphenate its spaces.
pub fn slugify_phrase(phrase: &str) -> String {
    phrase.to_lowercase().replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
