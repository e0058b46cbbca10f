//! Configuration loader - parses stations.toml
//!
//! Separates station metadata and analysis settings from code, making it
//! easy to adjust tolerances, thresholds or the analysis period without
//! recompiling. The file carries two things: the analysis settings (centred
//! window radius, inclusive start/end dates) and one `[[station]]` record per
//! gauging station, ordered from upstream to downstream.
//!
//! Dates are quoted `"YYYY-MM-DD"` strings. Structural validation happens in
//! `AnalysisSettings::new` and `StationRegistry::new`; loading fails fast on
//! the first inconsistency.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::WaveError;
use crate::stations::StationRegistry;

// ---------------------------------------------------------------------------
// Analysis settings
// ---------------------------------------------------------------------------

/// Global knobs of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    /// Centred-window radius for peak detection, in days. A sample is a peak
    /// when it strictly exceeds the `window_radius` samples behind it and is
    /// at least as large as the `window_radius` samples ahead.
    pub window_radius: u32,
    /// First day of the analysis period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the analysis period (inclusive).
    pub end_date: NaiveDate,
}

impl AnalysisSettings {
    pub fn new(
        window_radius: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, WaveError> {
        if end_date < start_date {
            return Err(WaveError::InvalidInterval {
                start: start_date,
                end: end_date,
            });
        }
        Ok(AnalysisSettings {
            window_radius: window_radius.max(1),
            start_date,
            end_date,
        })
    }
}

// ---------------------------------------------------------------------------
// Station records
// ---------------------------------------------------------------------------

/// One `[[station]]` record from stations.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Registration number of the gauge, used as the station id everywhere.
    pub id: String,
    pub name: String,

    /// Cumulative distance from the river origin in km; strictly decreasing
    /// along the downstream station order.
    pub river_km: f64,
    /// Elevation of the gauge zero above sea level, in cm.
    pub null_point: f64,
    /// Water level separating low from high water at this gauge, in cm.
    pub level_threshold: f64,

    /// Days a downstream peak may precede an upstream one and still continue
    /// its wave (alpha).
    pub backward_days: u32,
    /// Days a downstream peak may lag behind an upstream one (beta).
    pub forward_days: u32,

    /// Period during which the station produced data.
    pub lifetime: LifetimeConfig,
}

/// Existence interval of a station, inclusive on both ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LifetimeConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Root structure for TOML parsing.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default = "default_window_radius")]
    window_radius: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    station: Vec<StationConfig>,
}

fn default_window_radius() -> u32 {
    2
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a stations.toml document into validated settings and registry.
pub fn parse_registry(contents: &str) -> Result<(AnalysisSettings, StationRegistry), WaveError> {
    let file: RegistryFile = toml::from_str(contents)?;
    let settings = AnalysisSettings::new(file.window_radius, file.start_date, file.end_date)?;
    let registry = StationRegistry::new(file.station)?;
    log::info!(
        "loaded {} stations, analysis period {} .. {}",
        registry.len(),
        settings.start_date,
        settings.end_date
    );
    Ok((settings, registry))
}

/// Reads and parses a stations.toml file.
pub fn load_registry(path: &Path) -> Result<(AnalysisSettings, StationRegistry), WaveError> {
    let contents = fs::read_to_string(path).map_err(|source| WaveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_registry(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
