//! The flood-wave graph.
//!
//! Vertices are `(station, date)` peaks, edges run from an upstream peak to
//! a downstream continuation and carry the slope computed when the link was
//! made. The structure is two ordered collections — a vertex map and an
//! adjacency map with both directions — so that every traversal visits
//! vertices and neighbours in `(station, date)` order and the whole analysis
//! stays deterministic. Edges always increase the station index, which is
//! what makes the graph acyclic; `add_edge` refuses anything else.
//!
//! The graph is immutable once built: selections and analysis work on shared
//! references and produce independent copies.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::model::{NodeId, VertexInfo, WaveError};
use crate::stations::StationRegistry;

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveGraph {
    vertices: BTreeMap<NodeId, VertexInfo>,
    outgoing: BTreeMap<NodeId, Vec<(NodeId, f64)>>,
    incoming: BTreeMap<NodeId, Vec<NodeId>>,
}

impl WaveGraph {
    pub fn new() -> Self {
        WaveGraph::default()
    }

    /// Registers a vertex. Re-adding an existing vertex refreshes its
    /// payload and keeps its edges.
    pub fn add_vertex(&mut self, node: NodeId, info: VertexInfo) {
        self.vertices.insert(node, info);
    }

    /// Adds a directed edge between two registered vertices.
    ///
    /// The edge must cross a strict river-kilometre decrease, i.e. go from a
    /// lower to a higher station index; anything else (including self-loops)
    /// is rejected. Parallel edges collapse into one.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, slope: f64) -> Result<(), WaveError> {
        if from.station >= to.station {
            return Err(WaveError::InvalidEdge {
                from: from.station,
                to: to.station,
            });
        }
        debug_assert!(
            self.vertices.contains_key(&from) && self.vertices.contains_key(&to),
            "edge endpoints must be registered vertices"
        );

        let targets = self.outgoing.entry(from).or_default();
        match targets.binary_search_by_key(&to, |(node, _)| *node) {
            Ok(_) => return Ok(()), // already linked
            Err(position) => targets.insert(position, (to, slope)),
        }
        let sources = self.incoming.entry(to).or_default();
        if let Err(position) = sources.binary_search(&from) {
            sources.insert(position, from);
        }
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.vertices.contains_key(&node)
    }

    pub fn vertex_info(&self, node: NodeId) -> Option<&VertexInfo> {
        self.vertices.get(&node)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices in `(station, date)` order.
    pub fn vertices(&self) -> impl Iterator<Item = (NodeId, &VertexInfo)> {
        self.vertices.iter().map(|(node, info)| (*node, info))
    }

    /// Edges in `(source, target)` order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.outgoing.iter().flat_map(|(from, targets)| {
            targets.iter().map(move |(to, slope)| (*from, *to, *slope))
        })
    }

    /// Outgoing neighbours with slopes, ordered by target.
    pub fn out_neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        self.outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming neighbours, ordered by source.
    pub fn in_neighbors(&self, node: NodeId) -> &[NodeId] {
        self.incoming.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_neighbors(node).len()
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.in_neighbors(node).len()
    }

    pub fn slope_of(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let targets = self.outgoing.get(&from)?;
        targets
            .binary_search_by_key(&to, |(node, _)| *node)
            .ok()
            .map(|position| targets[position].1)
    }

    /// Merges another graph into this one by union of vertices and edges.
    pub fn merge(&mut self, other: &WaveGraph) {
        for (node, info) in other.vertices() {
            self.vertices.entry(node).or_insert(*info);
        }
        for (from, to, slope) in other.edges() {
            // Both endpoints were just merged in, and `other` already
            // enforced the direction invariant.
            let _ = self.add_edge(from, to, slope);
        }
    }

    // -----------------------------------------------------------------------
    // Components and subgraphs
    // -----------------------------------------------------------------------

    /// Weakly-connected components, each sorted, ordered by their smallest
    /// vertex.
    pub fn weakly_connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut components = Vec::new();

        for &start in self.vertices.keys() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::from([start]);
            seen.insert(start);
            while let Some(node) = queue.pop_front() {
                component.insert(node);
                let forward = self.out_neighbors(node).iter().map(|(next, _)| *next);
                let backward = self.in_neighbors(node).iter().copied();
                for neighbour in forward.chain(backward) {
                    if seen.insert(neighbour) {
                        queue.push_back(neighbour);
                    }
                }
            }
            components.push(component.into_iter().collect());
        }
        components
    }

    /// The subgraph induced on `keep`: a vertex survives iff it is in
    /// `keep`, an edge survives iff both of its endpoints do.
    pub fn subgraph(&self, keep: &BTreeSet<NodeId>) -> WaveGraph {
        let mut result = WaveGraph::new();
        for (node, info) in self.vertices() {
            if keep.contains(&node) {
                result.vertices.insert(node, *info);
            }
        }
        for (from, to, slope) in self.edges() {
            if keep.contains(&from) && keep.contains(&to) {
                // Direction was validated when the edge entered `self`.
                let _ = result.add_edge(from, to, slope);
            }
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Node-link serialisation
// ---------------------------------------------------------------------------

/// Serialisable node-link form of a graph. Nodes appear in `(station, date)`
/// order and links reference them by index, so the output is stable across
/// runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    pub nodes: Vec<NodeLinkNode>,
    pub links: Vec<NodeLinkEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub station: String,
    pub date: chrono::NaiveDate,
    pub level: f64,
    pub class: crate::model::LevelClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: usize,
    pub target: usize,
    pub slope: f64,
}

impl WaveGraph {
    pub fn to_node_link(&self, registry: &StationRegistry) -> NodeLinkGraph {
        let index_of: BTreeMap<NodeId, usize> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(index, node)| (*node, index))
            .collect();

        let nodes = self
            .vertices()
            .map(|(node, info)| NodeLinkNode {
                station: registry.get(node.station_index()).id.clone(),
                date: node.date(),
                level: info.level,
                class: info.class,
            })
            .collect();

        let links = self
            .edges()
            .map(|(from, to, slope)| NodeLinkEdge {
                source: index_of[&from],
                target: index_of[&to],
                slope,
            })
            .collect();

        NodeLinkGraph { nodes, links }
    }

    /// Rebuilds a graph from its node-link form. Stations are resolved
    /// against the registry; an unknown station id fails the whole load.
    pub fn from_node_link(
        registry: &StationRegistry,
        data: &NodeLinkGraph,
    ) -> Result<WaveGraph, WaveError> {
        let mut graph = WaveGraph::new();
        let mut ids = Vec::with_capacity(data.nodes.len());
        for node in &data.nodes {
            let station = registry.index_of(&node.station)?;
            let id = NodeId::new(station as u16, node.date);
            graph.add_vertex(
                id,
                VertexInfo {
                    level: node.level,
                    class: node.class,
                },
            );
            ids.push(id);
        }
        for link in &data.links {
            graph.add_edge(ids[link.source], ids[link.target], link.slope)?;
        }
        Ok(graph)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelClass;
    use chrono::NaiveDate;

    fn node(station: u16, day: &str) -> NodeId {
        NodeId::new(station, NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap())
    }

    fn info(level: f64) -> VertexInfo {
        VertexInfo {
            level,
            class: LevelClass::Low,
        }
    }

    fn graph_with(nodes: &[NodeId], edges: &[(NodeId, NodeId)]) -> WaveGraph {
        let mut graph = WaveGraph::new();
        for &n in nodes {
            graph.add_vertex(n, info(1.0));
        }
        for &(from, to) in edges {
            graph.add_edge(from, to, 0.5).unwrap();
        }
        graph
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let mut graph = graph_with(&[a, b], &[(a, b)]);
        graph.add_edge(a, b, 0.9).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.slope_of(a, b), Some(0.5), "first slope wins");
    }

    #[test]
    fn test_edges_must_run_downstream() {
        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let mut graph = graph_with(&[a, b], &[]);
        assert!(matches!(
            graph.add_edge(b, a, 0.0),
            Err(WaveError::InvalidEdge { .. })
        ));
        assert!(matches!(
            graph.add_edge(a, a, 0.0),
            Err(WaveError::InvalidEdge { .. })
        ));
    }

    #[test]
    fn test_degrees_and_neighbours() {
        let a = node(0, "2000-01-01");
        let b1 = node(1, "2000-01-02");
        let b2 = node(1, "2000-01-03");
        let graph = graph_with(&[a, b1, b2], &[(a, b1), (a, b2)]);
        assert_eq!(graph.out_degree(a), 2);
        assert_eq!(graph.in_degree(b1), 1);
        assert_eq!(graph.in_degree(a), 0);
        let targets: Vec<_> = graph.out_neighbors(a).iter().map(|(n, _)| *n).collect();
        assert_eq!(targets, vec![b1, b2], "neighbours are ordered");
    }

    #[test]
    fn test_weak_components_ignore_edge_direction() {
        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let c = node(0, "2000-06-01");
        let d = node(1, "2000-06-02");
        let lone = node(2, "2000-09-09");
        let graph = graph_with(&[a, b, c, d, lone], &[(a, b), (c, d)]);
        let components = graph.weakly_connected_components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], vec![a, b]);
        assert_eq!(components[1], vec![c, d]);
        assert_eq!(components[2], vec![lone], "isolated vertex is its own component");
    }

    #[test]
    fn test_subgraph_keeps_edge_only_with_both_endpoints() {
        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let c = node(2, "2000-01-03");
        let graph = graph_with(&[a, b, c], &[(a, b), (b, c)]);
        let keep = BTreeSet::from([a, b]);
        let sub = graph.subgraph(&keep);
        assert_eq!(sub.vertex_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert!(sub.slope_of(a, b).is_some());
        assert!(!sub.contains(c));
    }

    #[test]
    fn test_merge_is_a_union() {
        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let c = node(2, "2000-01-03");
        let mut left = graph_with(&[a, b], &[(a, b)]);
        let right = graph_with(&[b, c], &[(b, c)]);
        left.merge(&right);
        assert_eq!(left.vertex_count(), 3);
        assert_eq!(left.edge_count(), 2);
    }

    #[test]
    fn test_node_link_round_trip() {
        use crate::config::{LifetimeConfig, StationConfig};
        let configs = ["100", "80"]
            .iter()
            .enumerate()
            .map(|(i, id)| StationConfig {
                id: id.to_string(),
                name: id.to_string(),
                river_km: 100.0 - 20.0 * i as f64,
                null_point: 0.0,
                level_threshold: 500.0,
                backward_days: 0,
                forward_days: 2,
                lifetime: LifetimeConfig {
                    start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                    end: NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
                },
            })
            .collect();
        let registry = StationRegistry::new(configs).unwrap();

        let a = node(0, "2000-01-01");
        let b = node(1, "2000-01-02");
        let graph = graph_with(&[a, b], &[(a, b)]);

        let data = graph.to_node_link(&registry);
        assert_eq!(data.nodes[0].station, "100");
        assert_eq!(data.links.len(), 1);

        let rebuilt = WaveGraph::from_node_link(&registry, &data).unwrap();
        assert_eq!(rebuilt, graph);
    }
}
