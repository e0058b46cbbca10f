//! End-to-end tests for the flood-wave pipeline.
//!
//! These tests drive the public surface the way an operator tool would:
//! build a level table, assemble the graph, select, extract, analyse. The
//! data is a three-station reach ("100", "80", "60" at 100/80/60 river km)
//! carrying three waves in 2000:
//!
//! - January: a full wave 100 -> 80 -> 60 (Jan 3 -> Jan 4 -> Jan 6)
//! - March:   a wave that dies at "80" (Mar 10 -> Mar 11)
//! - June:    a wave that starts at "80" (Jun 10 -> Jun 11)
//!
//! Thresholds put both "60" crests into high water, everything else low.
//!
//! Run with: cargo test --test wave_pipeline

use chrono::NaiveDate;

use wavegraph::analysis::queries::{
    count_unfinished_waves, count_waves, flood_map, propagation_time, propagation_time_weighted,
    wave_velocities,
};
use wavegraph::analysis::stats::yearly_statistics;
use wavegraph::builder::GraphBuilder;
use wavegraph::config::{AnalysisSettings, LifetimeConfig, StationConfig};
use wavegraph::edges::link_adjacent;
use wavegraph::graph::WaveGraph;
use wavegraph::ingest::levels::LevelTable;
use wavegraph::model::{LevelClass, NodeId, Peak, VertexInfo};
use wavegraph::peaks::detect_peaks;
use wavegraph::selection::{
    select_by_water_level, select_intersecting_with_interval, select_only_in_interval,
};
use wavegraph::series::GaugeSeries;
use wavegraph::stations::StationRegistry;
use wavegraph::waves::{extract_wave_classes, extract_waves};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn station_config(id: &str, river_km: f64, threshold: f64) -> StationConfig {
    StationConfig {
        id: id.to_string(),
        name: format!("Station {id}"),
        river_km,
        null_point: 0.0,
        level_threshold: threshold,
        backward_days: 0,
        forward_days: 2,
        lifetime: LifetimeConfig {
            start: date("2000-01-01"),
            end: date("2019-12-31"),
        },
    }
}

fn three_station_registry() -> StationRegistry {
    StationRegistry::new(vec![
        station_config("100", 100.0, 500.0),
        station_config("80", 80.0, 500.0),
        station_config("60", 60.0, 25.0),
    ])
    .unwrap()
}

fn settings() -> AnalysisSettings {
    AnalysisSettings::new(2, date("2000-01-01"), date("2000-12-31")).unwrap()
}

fn insert_run(levels: &mut LevelTable, station: &str, start: &str, values: &[f64]) {
    let first = date(start);
    for (offset, value) in values.iter().enumerate() {
        levels.insert_sample(station, first + chrono::Days::new(offset as u64), *value);
    }
}

fn three_wave_levels() -> LevelTable {
    let mut levels = LevelTable::new();
    // January: full wave, crests 30 / 25 / 30.
    insert_run(&mut levels, "100", "2000-01-01", &[10.0, 20.0, 30.0, 20.0, 10.0]);
    insert_run(&mut levels, "80", "2000-01-02", &[9.0, 10.0, 25.0, 24.0, 12.0]);
    insert_run(&mut levels, "60", "2000-01-04", &[9.0, 10.0, 30.0, 29.0, 28.0]);
    // March: dies at "80" ("60" stays quiet).
    insert_run(&mut levels, "100", "2000-03-08", &[10.0, 20.0, 35.0, 20.0, 10.0]);
    insert_run(&mut levels, "80", "2000-03-09", &[8.0, 9.0, 22.0, 21.0, 11.0]);
    // June: starts at "80" ("100" stays quiet).
    insert_run(&mut levels, "80", "2000-06-08", &[5.0, 6.0, 18.0, 17.0, 7.0]);
    insert_run(&mut levels, "60", "2000-06-09", &[6.0, 7.0, 26.0, 25.0, 24.0]);
    levels
}

fn built_graph() -> (StationRegistry, WaveGraph) {
    let registry = three_station_registry();
    let graph = GraphBuilder::new(&registry, settings())
        .build(&three_wave_levels())
        .unwrap();
    (registry, graph)
}

fn node(station: u16, day: &str) -> NodeId {
    NodeId::new(station, date(day))
}

fn manual_graph(nodes: &[NodeId], edges: &[(NodeId, NodeId)]) -> WaveGraph {
    let mut graph = WaveGraph::new();
    for &n in nodes {
        graph.add_vertex(
            n,
            VertexInfo {
                level: 1.0,
                class: LevelClass::Low,
            },
        );
    }
    for &(from, to) in edges {
        graph.add_edge(from, to, 0.0).unwrap();
    }
    graph
}

// ---------------------------------------------------------------------------
// Scenario: single isolated peak
// ---------------------------------------------------------------------------

#[test]
fn test_single_station_yields_one_peak_and_no_edges() {
    let registry = StationRegistry::new(vec![station_config("100", 100.0, 500.0)]).unwrap();
    let mut levels = LevelTable::new();
    insert_run(&mut levels, "100", "2000-01-01", &[10.0, 20.0, 30.0, 20.0, 10.0]);

    let builder = GraphBuilder::new(&registry, settings());
    let peaks = builder.station_peaks(&levels, 0);
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].date, date("2000-01-03"));
    assert_eq!(peaks[0].level, 30.0);
    assert_eq!(peaks[0].class, LevelClass::Low);

    let graph = builder.build(&levels).unwrap();
    assert_eq!(graph.edge_count(), 0, "one station has no downstream partner");
}

#[test]
fn test_plateau_is_detected_on_its_first_day() {
    let series = GaugeSeries::from_samples(
        [0.0, 5.0, 10.0, 10.0, 5.0, 0.0]
            .iter()
            .enumerate()
            .map(|(offset, level)| (date("2000-01-01") + chrono::Days::new(offset as u64), *level)),
    );
    let peaks = detect_peaks(&series, 2, 500.0);
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].date, date("2000-01-03"));
}

// ---------------------------------------------------------------------------
// Scenario: branching edges
// ---------------------------------------------------------------------------

#[test]
fn test_branching_one_upstream_peak_to_three_downstream_peaks() {
    let registry = three_station_registry();
    let upstream = registry.get(0);
    let downstream = registry.get(1);

    let up_peaks = vec![Peak::new(date("2000-01-10"), 100.0, 500.0)];
    let down_peaks: Vec<Peak> = ["2000-01-10", "2000-01-11", "2000-01-12"]
        .iter()
        .map(|d| Peak::new(date(d), 120.0, 500.0))
        .collect();

    let links = link_adjacent(upstream, downstream, &up_peaks, &down_peaks);
    assert_eq!(links.len(), 3);
    for link in &links {
        assert_eq!(link.slope, (120.0 - 100.0) / 20.0);
    }
}

// ---------------------------------------------------------------------------
// Scenario: wave enumeration in the diamond
// ---------------------------------------------------------------------------

#[test]
fn test_diamond_collapses_to_one_wave_but_two_paths() {
    let (a1, b2, b3, c3) = (
        node(0, "2000-01-01"),
        node(1, "2000-01-02"),
        node(1, "2000-01-03"),
        node(2, "2000-01-03"),
    );
    let graph = manual_graph(&[a1, b2, b3, c3], &[(a1, b2), (b2, c3), (a1, b3), (b3, c3)]);

    let collapsed = extract_waves(&graph);
    assert_eq!(collapsed.len(), 1);

    let expanded: usize = extract_wave_classes(&graph).iter().map(Vec::len).sum();
    assert_eq!(expanded, 2);
    assert!(collapsed.len() <= expanded);
}

// ---------------------------------------------------------------------------
// Scenario: unfinished wave
// ---------------------------------------------------------------------------

#[test]
fn test_lone_upstream_edge_is_unfinished_between_the_outer_stations() {
    let (a1, b2) = (node(0, "2000-01-01"), node(1, "2000-01-02"));
    let graph = manual_graph(&[a1, b2], &[(a1, b2)]);
    assert_eq!(count_unfinished_waves(&graph, 0, 2), 1);
    assert_eq!(count_waves(&graph, 0, 2), 0);
}

// ---------------------------------------------------------------------------
// Scenario: flood map aggregation
// ---------------------------------------------------------------------------

#[test]
fn test_flood_map_counts_three_parallel_paths_and_skips_quiet_sections() {
    let (a1, b2, b3, b4, c5) = (
        node(0, "2000-01-01"),
        node(1, "2000-01-02"),
        node(1, "2000-01-03"),
        node(1, "2000-01-04"),
        node(2, "2000-01-05"),
    );
    // Dense traffic between stations 0 and 1; nothing from 1 on to 2 in the
    // second component.
    let lone = node(2, "2000-06-01");
    let graph = manual_graph(
        &[a1, b2, b3, b4, c5, lone],
        &[(a1, b2), (a1, b3), (a1, b4), (b2, c5), (b3, c5), (b4, c5)],
    );

    let map = flood_map(&graph, &[0, 2]);
    assert_eq!(map.edge_count(), 1);
    assert_eq!(map.weight(a1, c5), Some(3), "three equally short routes");

    let per_section = flood_map(&graph, &[0, 1, 2]);
    assert_eq!(per_section.weight(a1, b2), Some(1));
    assert_eq!(per_section.weight(b4, c5), Some(1));
    assert!(per_section.weight(a1, c5).is_none(), "sections do not span");
}

// ---------------------------------------------------------------------------
// Full pipeline: table -> graph -> analysis
// ---------------------------------------------------------------------------

#[test]
fn test_pipeline_assembles_three_components() {
    let (_, graph) = built_graph();
    assert_eq!(graph.vertex_count(), 7);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.weakly_connected_components().len(), 3);
}

#[test]
fn test_pipeline_counts_full_and_unfinished_waves() {
    let (_, graph) = built_graph();
    assert_eq!(count_waves(&graph, 0, 2), 1, "only January runs the whole reach");
    assert_eq!(
        count_unfinished_waves(&graph, 0, 2),
        1,
        "March touches \"100\" and dies at \"80\"; June never touches \"100\""
    );
}

#[test]
fn test_pipeline_propagation_times() {
    let (_, graph) = built_graph();
    assert_eq!(propagation_time(&graph, 0, 2), 3.0, "Jan 3 to Jan 6");
    assert_eq!(
        propagation_time_weighted(&graph, 0, 2),
        3.0,
        "a single path per pair leaves the weighted mean unchanged"
    );
}

#[test]
fn test_pipeline_velocities() {
    let (registry, graph) = built_graph();
    let velocities = wave_velocities(&graph, &registry);
    assert_eq!(
        velocities,
        vec![40.0 / 3.0, 20.0, 20.0],
        "January 40 km / 3 days, March and June 20 km / 1 day"
    );
}

#[test]
fn test_pipeline_every_edge_honours_window_and_river_order() {
    let (registry, graph) = built_graph();
    for (from, to, _) in graph.edges() {
        let upstream = registry.get(from.station_index());
        let downstream = registry.get(to.station_index());
        assert!(
            upstream.river_km > downstream.river_km,
            "edges must descend the river"
        );
        let lag = (to.date() - from.date()).num_days();
        assert!(
            lag >= -(upstream.backward_days as i64) && lag <= upstream.forward_days as i64,
            "edge {} -> {} violates the tolerance window",
            from.date(),
            to.date()
        );
    }
}

#[test]
fn test_pipeline_graph_is_acyclic_by_station_order() {
    let (_, graph) = built_graph();
    for (from, to, _) in graph.edges() {
        assert!(from.station < to.station);
    }
}

#[test]
fn test_pipeline_selections_compose_and_stay_idempotent() {
    let (_, graph) = built_graph();
    let once = select_only_in_interval(&graph, 0, 1);
    let twice = select_only_in_interval(&once, 0, 1);
    assert_eq!(once, twice);

    let composed = select_only_in_interval(&select_intersecting_with_interval(&graph, 0, 1), 0, 1);
    assert_eq!(composed, once);
}

#[test]
fn test_pipeline_high_water_selection_keeps_both_60_components() {
    let (_, graph) = built_graph();
    let high = select_by_water_level(&graph, 2, LevelClass::High);
    assert_eq!(
        high.weakly_connected_components().len(),
        2,
        "January and June both crest above threshold at \"60\""
    );
    let low = select_by_water_level(&graph, 2, LevelClass::Low);
    assert!(low.is_empty(), "no low-water crest exists at \"60\"");
}

#[test]
fn test_pipeline_yearly_statistics() {
    let (registry, graph) = built_graph();
    let rows = yearly_statistics(&graph, &registry, 2000..=2001);
    assert_eq!(rows[0].wave_count, 3);
    assert_eq!(rows[0].high_vertices, 2, "the two \"60\" crests");
    assert_eq!(rows[0].low_vertices, 5);
    assert_eq!(rows[1].wave_count, 0, "2001 is empty");
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn test_node_link_form_round_trips_through_disk() {
    let (registry, graph) = built_graph();
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("graph.json");

    wavegraph::io::write_json(&path, &graph.to_node_link(&registry)).expect("write");
    let data: wavegraph::graph::NodeLinkGraph = wavegraph::io::read_json(&path).expect("read");
    let rebuilt = WaveGraph::from_node_link(&registry, &data).expect("rebuild");
    assert_eq!(rebuilt, graph);
}

#[test]
fn test_node_link_output_is_stable_across_runs() {
    let (registry, graph) = built_graph();
    let first = serde_json::to_string(&graph.to_node_link(&registry)).unwrap();
    let second = serde_json::to_string(&built_graph().1.to_node_link(&registry)).unwrap();
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Shipped configuration
// ---------------------------------------------------------------------------

#[test]
fn test_shipped_stations_toml_loads_and_is_ordered() {
    let (settings, registry) =
        wavegraph::config::load_registry(std::path::Path::new("stations.toml"))
            .expect("the repository stations.toml must stay valid");
    assert!(registry.len() >= 8, "the Tisza reach has at least 8 gauges");
    assert!(settings.start_date < settings.end_date);
    for pair in registry.adjacent_pairs().collect::<Vec<_>>() {
        assert!(registry.get(pair.0).river_km > registry.get(pair.1).river_km);
    }
}
