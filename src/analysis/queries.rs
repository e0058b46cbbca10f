//! Graph-analytic queries between two stations.
//!
//! Everything here reads an already-built graph; the selection module does
//! the topological narrowing first and these functions ask the question. A
//! "full wave" between two stations is an equivalence-collapsed wave whose
//! first vertex sits at the start station and whose last vertex sits at the
//! end station.

use std::collections::BTreeMap;

use crate::graph::WaveGraph;
use crate::model::NodeId;
use crate::selection::{select_full_from_start_to_end, select_only_in_interval};
use crate::stations::StationRegistry;
use crate::waves::{FloodWave, all_shortest_paths, extract_wave_classes, extract_waves};

// ---------------------------------------------------------------------------
// Wave counts
// ---------------------------------------------------------------------------

fn is_full_wave(wave: &FloodWave, start_station: usize, end_station: usize) -> bool {
    match (wave.first(), wave.last()) {
        (Some(first), Some(last)) => {
            first.station_index() == start_station && last.station_index() == end_station
        }
        _ => false,
    }
}

/// Number of flood waves that start at `start_station` and reach
/// `end_station`, equivalence-collapsed.
pub fn count_waves(graph: &WaveGraph, start_station: usize, end_station: usize) -> usize {
    let selected = select_full_from_start_to_end(graph, start_station, end_station);
    extract_waves(&selected)
        .iter()
        .filter(|wave| is_full_wave(wave, start_station, end_station))
        .count()
}

/// Number of flood waves inside the station interval that touch
/// `start_station` but die out before `end_station`.
pub fn count_unfinished_waves(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
) -> usize {
    let selected = select_only_in_interval(graph, start_station, end_station);
    extract_waves(&selected)
        .iter()
        .filter(|wave| {
            let touches_start = wave
                .iter()
                .any(|node| node.station_index() == start_station);
            let reaches_end = wave
                .last()
                .is_some_and(|node| node.station_index() == end_station);
            touches_start && !reaches_end
        })
        .count()
}

// ---------------------------------------------------------------------------
// Propagation time
// ---------------------------------------------------------------------------

fn wave_days(wave: &FloodWave) -> i64 {
    match (wave.first(), wave.last()) {
        (Some(first), Some(last)) => (last.date() - first.date()).num_days(),
        _ => 0,
    }
}

/// Mean travel time in days of the full waves between two stations, each
/// source–sink pair counted once. Returns 0.0 when there are none — the one
/// empty-set statistic with a zero convention instead of NaN.
pub fn propagation_time(graph: &WaveGraph, start_station: usize, end_station: usize) -> f64 {
    let selected = select_full_from_start_to_end(graph, start_station, end_station);
    let times: Vec<i64> = extract_waves(&selected)
        .iter()
        .filter(|wave| is_full_wave(wave, start_station, end_station))
        .map(wave_days)
        .collect();
    if times.is_empty() {
        return 0.0;
    }
    times.iter().sum::<i64>() as f64 / times.len() as f64
}

/// Mean travel time weighted by path multiplicity: every shortest path of
/// every full wave contributes its day difference once. Returns 0.0 when
/// there are none.
pub fn propagation_time_weighted(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
) -> f64 {
    let selected = select_full_from_start_to_end(graph, start_station, end_station);
    let mut total = 0i64;
    let mut count = 0usize;
    for class in extract_wave_classes(&selected) {
        if !class
            .first()
            .is_some_and(|wave| is_full_wave(wave, start_station, end_station))
        {
            continue;
        }
        for wave in &class {
            total += wave_days(wave);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    total as f64 / count as f64
}

// ---------------------------------------------------------------------------
// Velocities
// ---------------------------------------------------------------------------

/// Velocity of one wave in km/day. A same-day arrival uses the distance
/// itself, treating one day as the upper bound of the travel time.
pub fn wave_velocity(wave: &FloodWave, registry: &StationRegistry) -> f64 {
    let (Some(first), Some(last)) = (wave.first(), wave.last()) else {
        return 0.0;
    };
    let distance =
        registry.get(first.station_index()).river_km - registry.get(last.station_index()).river_km;
    let days = wave_days(wave);
    if days == 0 {
        distance
    } else {
        distance / days as f64
    }
}

/// Velocities of every equivalence-collapsed wave in the graph.
pub fn wave_velocities(graph: &WaveGraph, registry: &StationRegistry) -> Vec<f64> {
    extract_waves(graph)
        .iter()
        .map(|wave| wave_velocity(wave, registry))
        .collect()
}

// ---------------------------------------------------------------------------
// Flood map
// ---------------------------------------------------------------------------

/// Aggregated wave traffic between consecutive section endpoints: one
/// weighted edge per connected vertex pair, the weight counting the
/// shortest paths between the two vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloodMap {
    weights: BTreeMap<(NodeId, NodeId), usize>,
}

impl FloodMap {
    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.weights.get(&(from, to)).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, usize)> + '_ {
        self.weights
            .iter()
            .map(|(&(from, to), &weight)| (from, to, weight))
    }
}

/// Builds the flood map of `graph` over the given section endpoints
/// (station indices, upstream first). For each consecutive endpoint pair and
/// each weakly-connected component, every vertex pair `(x at a, y at b)`
/// connected by at least one path contributes an edge weighted by its number
/// of shortest paths.
pub fn flood_map(graph: &WaveGraph, section_endpoints: &[usize]) -> FloodMap {
    let components = graph.weakly_connected_components();
    let mut map = FloodMap::default();

    for window in section_endpoints.windows(2) {
        let (a, b) = (window[0], window[1]);
        for component in &components {
            let starts: Vec<NodeId> = component
                .iter()
                .copied()
                .filter(|node| node.station_index() == a)
                .collect();
            let ends: Vec<NodeId> = component
                .iter()
                .copied()
                .filter(|node| node.station_index() == b)
                .collect();
            for &start in &starts {
                for &end in &ends {
                    let paths = all_shortest_paths(graph, start, end).len();
                    if paths > 0 {
                        *map.weights.entry((start, end)).or_insert(0) += paths;
                    }
                }
            }
        }
    }
    map
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
