//! Daily water-level series of a single station.
//!
//! A `GaugeSeries` lays the observed samples out at consecutive daily
//! offsets between the first and last observed date, with `None` marking the
//! days nothing was recorded. Peak detection needs this dense layout: its
//! centred window walks day offsets, and a gap inside the window disqualifies
//! the candidate.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// One station's daily series at consecutive day offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSeries {
    first_day: Option<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl GaugeSeries {
    /// Builds a series from date/level samples, in any order. Duplicate
    /// dates keep the last value seen.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let sorted: BTreeMap<NaiveDate, f64> = samples.into_iter().collect();
        let (Some((&first, _)), Some((&last, _))) =
            (sorted.first_key_value(), sorted.last_key_value())
        else {
            return GaugeSeries {
                first_day: None,
                values: Vec::new(),
            };
        };

        let span = (last - first).num_days() as usize + 1;
        let mut values = vec![None; span];
        for (date, level) in &sorted {
            values[(*date - first).num_days() as usize] = Some(*level);
        }
        GaugeSeries {
            first_day: Some(first),
            values,
        }
    }

    /// Builds a series from the samples dated inside `[start, end]`.
    pub fn from_samples_between<I>(samples: I, start: NaiveDate, end: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::from_samples(
            samples
                .into_iter()
                .filter(|(date, _)| *date >= start && *date <= end),
        )
    }

    /// Number of day slots, observed or not.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Level at a day offset, `None` for gaps.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Calendar date of a day offset.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        let first = self
            .first_day
            .expect("date_at is only called on non-empty series");
        first + Days::new(index as u64)
    }

    /// Number of days with an observation.
    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
