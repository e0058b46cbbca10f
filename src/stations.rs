//! Station registry for one river.
//!
//! Holds the canonical ordered list of gauging stations, upstream first,
//! and is the single source of truth for station metadata — every other
//! module references stations by registry index rather than carrying ids
//! around. Construction validates the structural assumptions the whole
//! pipeline rests on: unique ids, strictly decreasing river kilometres
//! (acyclicity of the wave graph depends on this) and sane existence
//! intervals.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::StationConfig;
use crate::model::WaveError;

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// Metadata for a single gauging station.
#[derive(Debug, Clone)]
pub struct Station {
    /// Registration number of the gauge.
    pub id: String,
    /// Human-readable station name.
    pub name: String,
    /// Cumulative distance from the river origin in km.
    pub river_km: f64,
    /// Elevation of the gauge zero above sea level, in cm.
    pub null_point: f64,
    /// Level separating low from high water at this gauge, in cm.
    pub level_threshold: f64,
    /// Tolerance in days for a downstream peak preceding an upstream one.
    pub backward_days: u32,
    /// Tolerance in days for a downstream peak lagging an upstream one.
    pub forward_days: u32,
    /// First and last day (inclusive) the station produced data.
    pub lifetime: (NaiveDate, NaiveDate),
}

impl From<StationConfig> for Station {
    fn from(config: StationConfig) -> Self {
        Station {
            id: config.id,
            name: config.name,
            river_km: config.river_km,
            null_point: config.null_point,
            level_threshold: config.level_threshold,
            backward_days: config.backward_days,
            forward_days: config.forward_days,
            lifetime: (config.lifetime.start, config.lifetime.end),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Validated, ordered station list with O(1) id lookup.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Station>,
    by_id: HashMap<String, usize>,
}

impl StationRegistry {
    /// Builds a registry from configuration records, upstream first.
    ///
    /// Fails on duplicate ids, on river kilometres that do not strictly
    /// decrease along the list, and on existence intervals that end before
    /// they start.
    pub fn new(configs: Vec<StationConfig>) -> Result<Self, WaveError> {
        let stations: Vec<Station> = configs.into_iter().map(Station::from).collect();

        let mut by_id = HashMap::with_capacity(stations.len());
        for (index, station) in stations.iter().enumerate() {
            if by_id.insert(station.id.clone(), index).is_some() {
                return Err(WaveError::DuplicateStation(station.id.clone()));
            }
            let (start, end) = station.lifetime;
            if end < start {
                return Err(WaveError::InvalidLifetime {
                    station: station.id.clone(),
                    start,
                    end,
                });
            }
        }

        for pair in stations.windows(2) {
            if pair[1].river_km >= pair[0].river_km {
                return Err(WaveError::InconsistentOrdering {
                    upstream: pair[0].id.clone(),
                    upstream_km: pair[0].river_km,
                    downstream: pair[1].id.clone(),
                    downstream_km: pair[1].river_km,
                });
            }
        }

        Ok(StationRegistry { stations, by_id })
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Station at a registry index. Indices come from this registry, so an
    /// out-of-range index is a programming error and panics like slice
    /// indexing does.
    pub fn get(&self, index: usize) -> &Station {
        &self.stations[index]
    }

    /// Resolves a station id to its registry index.
    pub fn index_of(&self, id: &str) -> Result<usize, WaveError> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| WaveError::MissingStation(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Indices of consecutive station pairs, upstream before downstream.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..self.stations.len()).map(|i| (i - 1, i))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
