//! Shared domain types for the flood-wave graph pipeline.
//!
//! Everything downstream of ingestion speaks in terms of these types: a
//! station's daily series yields `Peak`s, adjacent stations' peaks are tied
//! together as `PeakLink`s, and the assembled graph addresses its vertices
//! with the packed `NodeId`. The crate-wide error enum lives here as well so
//! that every module reports failures through the same surface.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Water-level classification
// ---------------------------------------------------------------------------

/// Classification of a peak against its station's level threshold.
///
/// Serialises as `"low"` / `"high"`, the form used in the persisted peak
/// listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelClass {
    Low,
    High,
}

impl LevelClass {
    /// A peak is `High` iff its level reaches the station threshold.
    pub fn classify(level: f64, threshold: f64) -> Self {
        if level >= threshold {
            LevelClass::High
        } else {
            LevelClass::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Peaks and pairwise links
// ---------------------------------------------------------------------------

/// A local maximum of one station's daily water-level series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub date: NaiveDate,
    /// Gauge reading in cm above the station null point.
    pub level: f64,
    pub class: LevelClass,
}

impl Peak {
    pub fn new(date: NaiveDate, level: f64, threshold: f64) -> Self {
        Peak {
            date,
            level,
            class: LevelClass::classify(level, threshold),
        }
    }
}

/// A directed link from an upstream peak to a downstream peak whose date
/// fell inside the upstream station's tolerance window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLink {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Water-surface slope along the link in cm/km, computed on
    /// null-point-corrected levels.
    pub slope: f64,
}

// ---------------------------------------------------------------------------
// Packed vertex identity
// ---------------------------------------------------------------------------

/// Identity of a graph vertex: `(station index, day)`.
///
/// The station component is the index into the ordered registry (upstream
/// first), the day component is the day count from the Common Era epoch, so
/// the derived `Ord` sorts vertices by station from upstream to downstream
/// and then chronologically. Hashing and equality are allocation-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub station: u16,
    pub day: i32,
}

impl NodeId {
    pub fn new(station: u16, date: NaiveDate) -> Self {
        NodeId {
            station,
            day: date.num_days_from_ce(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        // The day offset only ever comes from a NaiveDate, so it is always
        // convertible back.
        NaiveDate::from_num_days_from_ce_opt(self.day)
            .expect("node day offset derived from a valid date")
    }

    pub fn station_index(&self) -> usize {
        self.station as usize
    }
}

/// Water-level payload attached to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexInfo {
    pub level: f64,
    pub class: LevelClass,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Crate-wide error type.
///
/// Structural and configuration problems surface through these variants;
/// recoverable conditions (empty series, no peaks, no edges, no paths) are
/// absorbed into empty outputs instead.
#[derive(Debug, Error)]
pub enum WaveError {
    #[error("station '{0}' is not present in the registry")]
    MissingStation(String),

    #[error("duplicate station id '{0}' in the registry")]
    DuplicateStation(String),

    #[error("invalid analysis interval: end {end} precedes start {start}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },

    #[error("station '{station}' has an existence interval ending {end}, before its start {start}")]
    InvalidLifetime {
        station: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(
        "river kilometres must strictly decrease downstream: \
         '{upstream}' at {upstream_km} km is followed by '{downstream}' at {downstream_km} km"
    )]
    InconsistentOrdering {
        upstream: String,
        upstream_km: f64,
        downstream: String,
        downstream_km: f64,
    },

    #[error("edge must run from an upstream station to a downstream one (got {from} -> {to})")]
    InvalidEdge { from: u16, to: u16 },

    #[error("missing column '{0}' in input table")]
    MissingColumn(String),

    #[error("invalid numeric value '{0}' in input table")]
    InvalidNumber(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON input")]
    Json(#[from] serde_json::Error),

    #[error("malformed configuration file")]
    Toml(#[from] toml::de::Error),

    #[error("malformed table input")]
    Csv(#[from] csv::Error),
}

/// Parses a `YYYY-MM-DD` string, the only date format accepted anywhere in
/// the crate.
pub fn parse_date(text: &str) -> Result<NaiveDate, WaveError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| WaveError::InvalidDate(text.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_classification_is_high_exactly_at_threshold() {
        assert_eq!(LevelClass::classify(649.9, 650.0), LevelClass::Low);
        assert_eq!(
            LevelClass::classify(650.0, 650.0),
            LevelClass::High,
            "a level equal to the threshold counts as high water"
        );
        assert_eq!(LevelClass::classify(651.0, 650.0), LevelClass::High);
    }

    #[test]
    fn test_node_id_round_trips_its_date() {
        let d = date("1970-03-01");
        let node = NodeId::new(3, d);
        assert_eq!(node.date(), d);
        assert_eq!(node.station_index(), 3);
    }

    #[test]
    fn test_node_id_orders_by_station_then_date() {
        let a = NodeId::new(0, date("2000-01-02"));
        let b = NodeId::new(1, date("2000-01-01"));
        let c = NodeId::new(1, date("2000-01-03"));
        assert!(a < b, "upstream stations sort first regardless of date");
        assert!(b < c, "same station sorts chronologically");
    }

    #[test]
    fn test_level_class_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&LevelClass::Low).unwrap(), "\"low\"");
        assert_eq!(serde_json::to_string(&LevelClass::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2000-01-01").is_ok());
        assert!(parse_date("01/02/2000").is_err());
        assert!(parse_date("2000-13-01").is_err());
    }
}
