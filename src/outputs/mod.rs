//! Output generation.
//!
//! # Submodules
//!
//! - [`xlsx`]: writes the collected [`crate::models::NewsRecord`]s to a spreadsheet
//!
//! Downloaded thumbnails are written next to the spreadsheet by
//! [`crate::download`] while the articles are being extracted.

pub mod xlsx;
