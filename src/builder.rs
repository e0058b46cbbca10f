//! Assembling the full flood-wave graph from daily level tables.
//!
//! The analysis period is first partitioned at every station existence
//! boundary falling inside it. Each sub-period then runs peak detection and
//! peak linking over the stations alive in that sub-period only, with
//! adjacency taken over the live list — when an intermediate station is dead,
//! its neighbours link directly, so station births and deaths do not cut
//! waves artificially. The sub-period results accumulate into one graph by
//! union of vertices and edges.
//!
//! By default only peaks that participate in an edge become vertices;
//! visualisation callers can ask for the isolated peaks as well.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::config::AnalysisSettings;
use crate::edges::link_adjacent;
use crate::graph::WaveGraph;
use crate::ingest::levels::LevelTable;
use crate::model::{NodeId, Peak, VertexInfo, WaveError};
use crate::peaks::detect_peaks;
use crate::stations::StationRegistry;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct GraphBuilder<'a> {
    registry: &'a StationRegistry,
    settings: AnalysisSettings,
    include_isolated: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(registry: &'a StationRegistry, settings: AnalysisSettings) -> Self {
        GraphBuilder {
            registry,
            settings,
            include_isolated: false,
        }
    }

    /// Also materialise peaks that take part in no edge. Off by default;
    /// analytic queries only care about connected structure.
    pub fn include_isolated_peaks(mut self, include: bool) -> Self {
        self.include_isolated = include;
        self
    }

    /// Peaks of one station over the whole analysis period, the source of
    /// the per-station peak listing.
    pub fn station_peaks(&self, levels: &LevelTable, station: usize) -> Vec<Peak> {
        let meta = self.registry.get(station);
        let series =
            levels.series_between(&meta.id, self.settings.start_date, self.settings.end_date);
        detect_peaks(&series, self.settings.window_radius, meta.level_threshold)
    }

    /// Builds the full graph.
    pub fn build(&self, levels: &LevelTable) -> Result<WaveGraph, WaveError> {
        let cuts = self.cut_dates();
        let mut graph = WaveGraph::new();

        if cuts.len() < 2 {
            // Degenerate single-day period; too short for any peak.
            return Ok(graph);
        }

        for window in cuts.windows(2) {
            let (period_start, period_end) = (window[0], window[1]);
            self.build_period(levels, period_start, period_end, &mut graph)?;
        }

        log::info!(
            "built graph with {} vertices and {} edges over {} sub-periods",
            graph.vertex_count(),
            graph.edge_count(),
            cuts.len() - 1
        );
        Ok(graph)
    }

    /// Partition dates: the analysis bounds plus every station lifetime
    /// boundary falling inside them, deduplicated and sorted.
    fn cut_dates(&self) -> Vec<NaiveDate> {
        let mut cuts = std::collections::BTreeSet::new();
        cuts.insert(self.settings.start_date);
        cuts.insert(self.settings.end_date);
        for station in self.registry.iter() {
            for bound in [station.lifetime.0, station.lifetime.1] {
                if bound >= self.settings.start_date && bound <= self.settings.end_date {
                    cuts.insert(bound);
                }
            }
        }
        cuts.into_iter().collect()
    }

    fn build_period(
        &self,
        levels: &LevelTable,
        period_start: NaiveDate,
        period_end: NaiveDate,
        graph: &mut WaveGraph,
    ) -> Result<(), WaveError> {
        // A station is alive in this sub-period when the day after the cut
        // falls inside its existence interval.
        let probe = period_start + Days::new(1);
        let live: Vec<usize> = (0..self.registry.len())
            .filter(|&index| {
                let (start, end) = self.registry.get(index).lifetime;
                start <= probe && probe <= end
            })
            .collect();

        let mut peaks_by_station: BTreeMap<usize, BTreeMap<NaiveDate, Peak>> = BTreeMap::new();
        for &index in &live {
            let meta = self.registry.get(index);
            let series = levels.series_between(&meta.id, period_start, period_end);
            let peaks = detect_peaks(&series, self.settings.window_radius, meta.level_threshold);
            if peaks.is_empty() {
                log::info!(
                    "no peaks found at {} between {period_start} and {period_end}",
                    meta.id
                );
            }
            peaks_by_station.insert(index, peaks.into_iter().map(|p| (p.date, p)).collect());
        }

        if self.include_isolated {
            for (&index, peaks) in &peaks_by_station {
                for peak in peaks.values() {
                    graph.add_vertex(
                        NodeId::new(index as u16, peak.date),
                        VertexInfo {
                            level: peak.level,
                            class: peak.class,
                        },
                    );
                }
            }
        }

        // Adjacency over the live list: consecutive live stations link.
        for pair in live.windows(2) {
            let (up_index, down_index) = (pair[0], pair[1]);
            let upstream = self.registry.get(up_index);
            let downstream = self.registry.get(down_index);
            let up_peaks: Vec<Peak> = peaks_by_station[&up_index].values().copied().collect();
            let down_peaks: Vec<Peak> = peaks_by_station[&down_index].values().copied().collect();

            for link in link_adjacent(upstream, downstream, &up_peaks, &down_peaks) {
                let from = NodeId::new(up_index as u16, link.from_date);
                let to = NodeId::new(down_index as u16, link.to_date);
                let from_peak = peaks_by_station[&up_index][&link.from_date];
                let to_peak = peaks_by_station[&down_index][&link.to_date];
                graph.add_vertex(
                    from,
                    VertexInfo {
                        level: from_peak.level,
                        class: from_peak.class,
                    },
                );
                graph.add_vertex(
                    to,
                    VertexInfo {
                        level: to_peak.level,
                        class: to_peak.class,
                    },
                );
                graph.add_edge(from, to, link.slope)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
