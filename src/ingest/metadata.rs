//! Station metadata ingestion.
//!
//! Three collaborator formats feed the registry when it is not written by
//! hand as stations.toml:
//!
//! - the semicolon-separated station metadata table (all rivers mixed; rows
//!   are filtered to one river and to stations carrying an `h_table` marker,
//!   then sorted by descending river kilometre),
//! - the level-threshold map, JSON object from station id to the low/high
//!   boundary,
//! - the existence-interval records, JSON object from station id to
//!   `{ "start": ..., "end": ... }`.
//!
//! `assemble_configs` joins the three into `StationConfig` records ready for
//! `StationRegistry::new`.

use std::collections::BTreeMap;

use crate::config::{LifetimeConfig, StationConfig};
use crate::model::WaveError;

// ---------------------------------------------------------------------------
// Metadata table
// ---------------------------------------------------------------------------

/// One row of the station metadata table, already filtered and ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRow {
    pub id: String,
    pub name: String,
    pub river_km: f64,
    pub null_point: f64,
}

/// Parses the metadata table, keeping the rows of `river` that carry an
/// `h_table` marker, ordered by descending river kilometre (upstream first).
pub fn parse_station_table(text: &str, river: &str) -> Result<Vec<MetadataRow>, WaveError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, WaveError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| WaveError::MissingColumn(name.to_string()))
    };
    let id_col = column("id")?;
    let river_col = column("river")?;
    let km_col = column("river_km")?;
    let null_col = column("null_point")?;
    let name_col = column("station_name")?;
    let h_table_col = column("h_table")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(river_col).unwrap_or("") != river {
            continue;
        }
        // Stations without an h_table entry do not take part in the analysis.
        if record.get(h_table_col).unwrap_or("").trim().is_empty() {
            continue;
        }
        let parse_float = |col: usize| -> Result<f64, WaveError> {
            let cell = record.get(col).unwrap_or("").trim();
            cell.parse::<f64>()
                .map_err(|_| WaveError::InvalidNumber(cell.to_string()))
        };
        rows.push(MetadataRow {
            id: record.get(id_col).unwrap_or("").to_string(),
            name: record.get(name_col).unwrap_or("").to_string(),
            river_km: parse_float(km_col)?,
            null_point: parse_float(null_col)?,
        });
    }

    rows.sort_by(|a, b| b.river_km.total_cmp(&a.river_km));
    log::debug!("metadata table: {} stations on river {river}", rows.len());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Threshold and lifetime records
// ---------------------------------------------------------------------------

/// Parses the level-threshold map.
pub fn parse_level_thresholds(json: &str) -> Result<BTreeMap<String, f64>, WaveError> {
    Ok(serde_json::from_str(json)?)
}

/// Parses the station existence-interval records.
pub fn parse_lifetimes(json: &str) -> Result<BTreeMap<String, LifetimeConfig>, WaveError> {
    Ok(serde_json::from_str(json)?)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Joins metadata rows with thresholds, lifetimes and tolerance maps into
/// registry-ready configuration records.
///
/// Every row must have a threshold and a lifetime; a station missing from
/// either map fails with `MissingStation`. Tolerances fall back to
/// `default_backward`/`default_forward` for stations absent from the maps.
pub fn assemble_configs(
    rows: Vec<MetadataRow>,
    thresholds: &BTreeMap<String, f64>,
    lifetimes: &BTreeMap<String, LifetimeConfig>,
    backward: &BTreeMap<String, u32>,
    forward: &BTreeMap<String, u32>,
    default_backward: u32,
    default_forward: u32,
) -> Result<Vec<StationConfig>, WaveError> {
    rows.into_iter()
        .map(|row| {
            let threshold = thresholds
                .get(&row.id)
                .copied()
                .ok_or_else(|| WaveError::MissingStation(row.id.clone()))?;
            let lifetime = lifetimes
                .get(&row.id)
                .copied()
                .ok_or_else(|| WaveError::MissingStation(row.id.clone()))?;
            Ok(StationConfig {
                backward_days: backward.get(&row.id).copied().unwrap_or(default_backward),
                forward_days: forward.get(&row.id).copied().unwrap_or(default_forward),
                id: row.id,
                name: row.name,
                river_km: row.river_km,
                null_point: row.null_point,
                level_threshold: threshold,
                lifetime,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
