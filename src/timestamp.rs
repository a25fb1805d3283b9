//! Dates embedded in export file names
//!
//! Exports are named `<prefix>-<hash>-DDMMYYYY.<ext>`, for example
//! `xxxxxxx-1c2b447a65025fc41ee91b794aa2305a-11042016.csv`.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static FILENAME_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-(\d{2})(\d{2})(\d{4})\.[^.]+$").expect("filename date pattern is valid")
});

/// Parse the DDMMYYYY date that precedes the extension of `file_name`
pub fn parse_filename_date(file_name: &str) -> Result<NaiveDate> {
    let caps = FILENAME_DATE
        .captures(file_name)
        .ok_or_else(|| anyhow!("no -DDMMYYYY component before the extension"))?;

    let day: u32 = caps[1].parse()?;
    let month: u32 = caps[2].parse()?;
    let year: i32 = caps[3].parse()?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("{}{}{} is not a valid DDMMYYYY date", &caps[1], &caps[2], &caps[3]))
}

/// Same as [`parse_filename_date`], taking the file name from a path
pub fn parse_path_date(path: &Path) -> Result<NaiveDate> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("path has no UTF-8 file name"))?;
    parse_filename_date(name)
}
