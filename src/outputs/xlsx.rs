//! Spreadsheet output.
//!
//! Writes the collected records to a single worksheet: one header row with
//! [`NewsRecord::COLUMNS`], then one row per record in collection order.
//!
//! ```text
//! output_dir/
//! ├── news_trade-war.xlsx
//! ├── tariffs-rise-again.png
//! └── ...
//! ```

use crate::error::ScrapeError;
use crate::models::NewsRecord;
use crate::utils::slugify_phrase;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// File name of the spreadsheet for a search phrase.
pub fn spreadsheet_filename(search_phrase: &str) -> String {
    format!("news_{}.xlsx", slugify_phrase(search_phrase))
}

/// Write `records` to `{output_dir}/news_{phrase}.xlsx`.
///
/// Returns the written path, or `None` when there was nothing to write. An
/// existing file with the same name is replaced.
#[instrument(level = "info", skip(records, output_dir), fields(count = records.len(), output_dir = %output_dir.display()))]
pub fn write_news(
    records: &[NewsRecord],
    search_phrase: &str,
    output_dir: &Path,
) -> Result<Option<PathBuf>, ScrapeError> {
    if records.is_empty() {
        warn!("No news data to save.");
        return Ok(None);
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    write_header(worksheet)?;
    for (i, record) in records.iter().enumerate() {
        write_row(worksheet, i as u32 + 1, record)?;
    }

    let path = output_dir.join(spreadsheet_filename(search_phrase));
    workbook.save(&path)?;
    info!(path = %path.display(), rows = records.len(), "News data saved");
    Ok(Some(path))
}

fn write_header(worksheet: &mut Worksheet) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, name) in NewsRecord::COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, row: u32, record: &NewsRecord) -> Result<(), XlsxError> {
    worksheet.write_string(row, 0, &record.title)?;
    worksheet.write_string(row, 1, &record.description)?;
    worksheet.write_string(row, 2, &record.date)?;
    worksheet.write_string(row, 3, &record.picture_path)?;
    worksheet.write_string(row, 4, &record.picture_filename)?;
    worksheet.write_number(row, 5, record.search_phrase_count as f64)?;
    worksheet.write_boolean(row, 6, record.contains_money)?;
    Ok(())
}
