//! Flood-wave extraction.
//!
//! A flood wave is a directed path from a vertex nothing points at to a
//! vertex pointing at nothing, inside one weakly-connected component, moving
//! strictly downstream. Branching at the linking stage makes many paths
//! between the same pair of end vertices "the same wave arriving equally
//! fast"; the equivalence-collapsed extraction keeps one shortest path per
//! source–sink pair, the expanded extraction enumerates every shortest path
//! when path-weighted statistics need them.
//!
//! Enumeration order is stable everywhere: vertices, neighbours and
//! therefore pairs and paths come out in `(station, date)` order, so
//! repeated runs agree.

use std::collections::{BTreeMap, VecDeque};

use crate::graph::WaveGraph;
use crate::model::NodeId;

/// One flood wave: the vertices along a directed path, upstream first.
pub type FloodWave = Vec<NodeId>;

// ---------------------------------------------------------------------------
// Sources and sinks
// ---------------------------------------------------------------------------

/// Vertices of a component with no incoming edge.
pub fn component_sources(graph: &WaveGraph, component: &[NodeId]) -> Vec<NodeId> {
    component
        .iter()
        .copied()
        .filter(|&node| graph.in_degree(node) == 0)
        .collect()
}

/// Vertices of a component with no outgoing edge.
pub fn component_sinks(graph: &WaveGraph, component: &[NodeId]) -> Vec<NodeId> {
    component
        .iter()
        .copied()
        .filter(|&node| graph.out_degree(node) == 0)
        .collect()
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

fn bfs_distances<F, I>(start: NodeId, neighbours: F) -> BTreeMap<NodeId, u32>
where
    F: Fn(NodeId) -> I,
    I: Iterator<Item = NodeId>,
{
    let mut distance = BTreeMap::from([(start, 0u32)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let next_distance = distance[&node] + 1;
        for neighbour in neighbours(node) {
            if !distance.contains_key(&neighbour) {
                distance.insert(neighbour, next_distance);
                queue.push_back(neighbour);
            }
        }
    }
    distance
}

/// One shortest path from `source` to `target`, or `None` when no path
/// exists. Deterministic: ties resolve towards the smallest vertex.
pub fn shortest_path(graph: &WaveGraph, source: NodeId, target: NodeId) -> Option<FloodWave> {
    let mut predecessor: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut queue = VecDeque::from([source]);
    predecessor.insert(source, source);

    while let Some(node) = queue.pop_front() {
        if node == target {
            break;
        }
        for &(next, _) in graph.out_neighbors(node) {
            if !predecessor.contains_key(&next) {
                predecessor.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    if !predecessor.contains_key(&target) {
        return None;
    }
    let mut path = vec![target];
    let mut node = target;
    while node != source {
        node = predecessor[&node];
        path.push(node);
    }
    path.reverse();
    Some(path)
}

/// Every shortest path from `source` to `target`, in lexicographic order.
///
/// Walks the shortest-path DAG with an explicit stack of
/// `(vertex, next-neighbour index)` frames rather than recursion.
pub fn all_shortest_paths(graph: &WaveGraph, source: NodeId, target: NodeId) -> Vec<FloodWave> {
    let from_source = bfs_distances(source, |node| {
        graph.out_neighbors(node).iter().map(|(next, _)| *next)
    });
    let Some(&total) = from_source.get(&target) else {
        return Vec::new();
    };
    let to_target = bfs_distances(target, |node| graph.in_neighbors(node).iter().copied());

    // An edge u -> v lies on a shortest path iff it advances the distance
    // from the source and still leaves the remaining distance to the target.
    let on_shortest = |from: NodeId, to: NodeId| -> bool {
        match (from_source.get(&from), from_source.get(&to), to_target.get(&to)) {
            (Some(&df), Some(&dt), Some(&rest)) => dt == df + 1 && dt + rest == total,
            _ => false,
        }
    };

    let mut paths = Vec::new();
    let mut path: FloodWave = vec![source];
    let mut stack: Vec<(NodeId, usize)> = vec![(source, 0)];

    loop {
        let Some(&(node, next_index)) = stack.last() else {
            break;
        };
        if node == target {
            paths.push(path.clone());
            stack.pop();
            path.pop();
            continue;
        }

        let neighbours = graph.out_neighbors(node);
        let mut index = next_index;
        let mut chosen = None;
        while index < neighbours.len() {
            let (candidate, _) = neighbours[index];
            index += 1;
            if on_shortest(node, candidate) {
                chosen = Some(candidate);
                break;
            }
        }
        if let Some((_, frame_index)) = stack.last_mut() {
            *frame_index = index;
        }
        match chosen {
            Some(next) => {
                stack.push((next, 0));
                path.push(next);
            }
            None => {
                stack.pop();
                path.pop();
            }
        }
    }
    paths
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn source_sink_pairs(graph: &WaveGraph) -> Vec<(NodeId, NodeId)> {
    let mut pairs = Vec::new();
    for component in graph.weakly_connected_components() {
        let sources = component_sources(graph, &component);
        let sinks = component_sinks(graph, &component);
        for &source in &sources {
            for &sink in &sinks {
                // The wave must move downstream: the source strictly
                // upstream of the sink.
                if source.station < sink.station {
                    pairs.push((source, sink));
                }
            }
        }
    }
    pairs
}

/// Equivalence-collapsed extraction: one shortest path per connected
/// source–sink pair.
pub fn extract_waves(graph: &WaveGraph) -> Vec<FloodWave> {
    source_sink_pairs(graph)
        .into_iter()
        .filter_map(|(source, sink)| shortest_path(graph, source, sink))
        .collect()
}

/// Expanded extraction: every shortest path, grouped per source–sink pair.
/// Pairs with no path contribute nothing.
pub fn extract_wave_classes(graph: &WaveGraph) -> Vec<Vec<FloodWave>> {
    source_sink_pairs(graph)
        .into_iter()
        .map(|(source, sink)| all_shortest_paths(graph, source, sink))
        .filter(|paths| !paths.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
