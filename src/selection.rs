//! Topological selections over a flood-wave graph.
//!
//! Every operation takes a graph by reference and returns an independent
//! copy; nothing here mutates. Component-level selections keep or drop whole
//! weakly-connected components, vertex-level selections drop individual
//! vertices; in both cases an edge survives iff both of its endpoints do,
//! which makes every selection idempotent.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::graph::WaveGraph;
use crate::model::{LevelClass, NodeId};

// ---------------------------------------------------------------------------
// Component-level selections
// ---------------------------------------------------------------------------

fn keep_components<F>(graph: &WaveGraph, mut keep_if: F) -> WaveGraph
where
    F: FnMut(&[NodeId]) -> bool,
{
    let mut keep: BTreeSet<NodeId> = BTreeSet::new();
    for component in graph.weakly_connected_components() {
        if keep_if(&component) {
            keep.extend(component);
        }
    }
    graph.subgraph(&keep)
}

/// Keeps the components that contain at least one vertex at `station`.
pub fn select_by_station(graph: &WaveGraph, station: usize) -> WaveGraph {
    keep_components(graph, |component| {
        component.iter().any(|node| node.station_index() == station)
    })
}

/// Keeps the components that touch the closed station interval
/// `[start_station, end_station]`.
pub fn select_intersecting_with_interval(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
) -> WaveGraph {
    let (lo, hi) = ordered(start_station, end_station);
    keep_components(graph, |component| {
        component
            .iter()
            .any(|node| (lo..=hi).contains(&node.station_index()))
    })
}

/// As `select_intersecting_with_interval`, then drops every vertex outside
/// the station interval.
pub fn select_only_in_interval(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
) -> WaveGraph {
    let (lo, hi) = ordered(start_station, end_station);
    let intersecting = select_intersecting_with_interval(graph, lo, hi);
    let keep: BTreeSet<NodeId> = intersecting
        .vertices()
        .map(|(node, _)| node)
        .filter(|node| (lo..=hi).contains(&node.station_index()))
        .collect();
    intersecting.subgraph(&keep)
}

/// Keeps the components that have a vertex of the requested water-level
/// class at `station`.
pub fn select_by_water_level(graph: &WaveGraph, station: usize, class: LevelClass) -> WaveGraph {
    keep_components(graph, |component| {
        component.iter().any(|node| {
            node.station_index() == station
                && graph
                    .vertex_info(*node)
                    .is_some_and(|info| info.class == class)
        })
    })
}

/// Keeps the components that contain a vertex at `start_station` and one at
/// `end_station`. Vertices outside the interval stay; path-level filtering
/// is the caller's business.
pub fn select_full_from_start_to_end(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
) -> WaveGraph {
    keep_components(graph, |component| {
        let touches_start = component
            .iter()
            .any(|node| node.station_index() == start_station);
        let touches_end = component
            .iter()
            .any(|node| node.station_index() == end_station);
        touches_start && touches_end
    })
}

// ---------------------------------------------------------------------------
// Vertex-level selections
// ---------------------------------------------------------------------------

/// Drops every vertex dated outside `[start_date, end_date]`.
pub fn select_time_interval(
    graph: &WaveGraph,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> WaveGraph {
    let keep: BTreeSet<NodeId> = graph
        .vertices()
        .map(|(node, _)| node)
        .filter(|node| {
            let date = node.date();
            date >= start_date && date <= end_date
        })
        .collect();
    graph.subgraph(&keep)
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
