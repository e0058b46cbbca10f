//! Daily water-level table parsing.
//!
//! The table is semicolon-separated with a `Date` column and one column per
//! station id. Cells that are blank or fail to parse as a number count as
//! missing readings and simply leave a gap in that station's series; the
//! gap handling downstream (peak detection) decides what a gap means.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{WaveError, parse_date};
use crate::series::GaugeSeries;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Per-station daily samples, keyed by station id.
#[derive(Debug, Clone, Default)]
pub struct LevelTable {
    columns: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl LevelTable {
    pub fn new() -> Self {
        LevelTable::default()
    }

    /// Adds a single observation, replacing any earlier value for the same
    /// station and day.
    pub fn insert_sample(&mut self, station: &str, date: NaiveDate, level: f64) {
        self.columns
            .entry(station.to_string())
            .or_default()
            .insert(date, level);
    }

    /// Parses a semicolon-separated level table.
    ///
    /// Every non-`Date` header names a station; a column with a blank header
    /// (e.g. an exported row index) is skipped.
    pub fn parse_csv(text: &str) -> Result<Self, WaveError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let date_column = headers
            .iter()
            .position(|h| h == "Date")
            .ok_or_else(|| WaveError::MissingColumn("Date".to_string()))?;

        let mut table = LevelTable::new();
        for record in reader.records() {
            let record = record?;
            let date_cell = record.get(date_column).unwrap_or("");
            let date = parse_date(date_cell)?;

            for (column, header) in headers.iter().enumerate() {
                if column == date_column || header.is_empty() {
                    continue;
                }
                let Some(cell) = record.get(column) else {
                    continue;
                };
                // Non-numeric cells (blank, markers like "-") are gaps.
                if let Ok(level) = cell.trim().parse::<f64>() {
                    table.insert_sample(header, date, level);
                }
            }
        }

        log::debug!("parsed level table with {} station columns", table.columns.len());
        Ok(table)
    }

    /// Ids of the stations present in the table.
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// All samples of one station, if the table carries it.
    pub fn samples(&self, station: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.columns.get(station)
    }

    /// Dense daily series of one station restricted to `[start, end]`.
    /// A station absent from the table yields an empty series.
    pub fn series_between(&self, station: &str, start: NaiveDate, end: NaiveDate) -> GaugeSeries {
        match self.columns.get(station) {
            Some(samples) => GaugeSeries::from_samples_between(
                samples.iter().map(|(date, level)| (*date, *level)),
                start,
                end,
            ),
            None => GaugeSeries::from_samples(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
