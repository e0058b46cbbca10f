//! Local peak detection over a station's daily series.
//!
//! A day is a peak when it strictly exceeds every reading in the
//! `window_radius` days behind it and is at least as large as every reading
//! in the `window_radius` days ahead. The strict-left / non-strict-right
//! asymmetry makes a flat-topped crest count exactly once, on its left-most
//! summit day. Days within the window radius of either end of the series
//! lack context and are never peaks, and a gap anywhere inside the window
//! disqualifies the candidate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{LevelClass, Peak};
use crate::series::GaugeSeries;

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Finds the peaks of a series and classifies them against the station's
/// level threshold.
///
/// A series shorter than `window_radius + 1` days cannot contain a peak and
/// yields an empty set; the caller decides whether that is worth reporting.
pub fn detect_peaks(series: &GaugeSeries, window_radius: u32, level_threshold: f64) -> Vec<Peak> {
    let radius = window_radius as usize;
    let n = series.len();
    if n < radius + 1 {
        return Vec::new();
    }

    let mut peaks = Vec::new();
    for index in radius..n - radius {
        let Some(level) = series.value(index) else {
            continue;
        };

        let window_holds = (1..=radius).all(|shift| {
            match (series.value(index - shift), series.value(index + shift)) {
                (Some(behind), Some(ahead)) => behind < level && level >= ahead,
                // A gap inside the window leaves the shape undecidable.
                _ => false,
            }
        });

        if window_holds {
            peaks.push(Peak::new(series.date_at(index), level, level_threshold));
        }
    }
    peaks
}

// ---------------------------------------------------------------------------
// Peak listing
// ---------------------------------------------------------------------------

/// Persisted form of one peak: `[level, "low" | "high"]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord(pub f64, pub LevelClass);

/// The per-station peak listing: `YYYY-MM-DD` date to `[level, class]`.
pub fn peak_listing(peaks: &[Peak]) -> BTreeMap<String, PeakRecord> {
    peaks
        .iter()
        .map(|peak| {
            (
                peak.date.format("%Y-%m-%d").to_string(),
                PeakRecord(peak.level, peak.class),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
