//! Statistical tables over years and year windows.
//!
//! The long-horizon analyses all share one shape: slice the graph to a year
//! or a window of years with `select_time_interval`, extract what the slice
//! holds, summarise. Years are independent of each other, so the yearly
//! table has a thread-pool variant that fans the years out to workers and
//! reassembles the rows in order.
//!
//! Empty summaries are NaN across the board; only the propagation-time
//! queries (in `queries`) use a zero convention.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::mpsc;

use chrono::{Datelike, NaiveDate};
use threadpool::ThreadPool;

use crate::analysis::queries::wave_velocities;
use crate::graph::WaveGraph;
use crate::model::LevelClass;
use crate::selection::{select_only_in_interval, select_time_interval};
use crate::stations::StationRegistry;
use crate::waves::{FloodWave, extract_waves};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Five-number summary of a sample. Every field is NaN for an empty sample.
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Summary {
        if values.is_empty() {
            return Summary {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
                std_dev: f64::NAN,
            };
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        // Population standard deviation.
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

        Summary {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
        }
    }
}

/// Mean of a sample, NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ---------------------------------------------------------------------------
// Yearly statistics table
// ---------------------------------------------------------------------------

/// One row of the yearly table.
#[derive(Debug, Clone)]
pub struct YearlyStats {
    pub year: i32,
    pub wave_count: usize,
    pub low_vertices: usize,
    pub high_vertices: usize,
    pub velocity: Summary,
}

fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1st exists in every year"),
        NaiveDate::from_ymd_opt(year, 12, 31).expect("December 31st exists in every year"),
    )
}

fn year_statistics(graph: &WaveGraph, registry: &StationRegistry, year: i32) -> YearlyStats {
    let (start, end) = year_bounds(year);
    let sliced = select_time_interval(graph, start, end);

    let mut low = 0;
    let mut high = 0;
    for (_, info) in sliced.vertices() {
        match info.class {
            LevelClass::Low => low += 1,
            LevelClass::High => high += 1,
        }
    }

    YearlyStats {
        year,
        wave_count: extract_waves(&sliced).len(),
        low_vertices: low,
        high_vertices: high,
        velocity: Summary::of(&wave_velocities(&sliced, registry)),
    }
}

/// Yearly table over an inclusive range of years.
pub fn yearly_statistics(
    graph: &WaveGraph,
    registry: &StationRegistry,
    years: RangeInclusive<i32>,
) -> Vec<YearlyStats> {
    years
        .map(|year| year_statistics(graph, registry, year))
        .collect()
}

/// As `yearly_statistics`, with the years fanned out to a worker pool.
/// Rows come back in year order regardless of completion order.
pub fn yearly_statistics_parallel(
    graph: Arc<WaveGraph>,
    registry: Arc<StationRegistry>,
    years: RangeInclusive<i32>,
    workers: usize,
) -> Vec<YearlyStats> {
    let pool = ThreadPool::new(workers.max(1));
    let (sender, receiver) = mpsc::channel();

    for year in years {
        let sender = sender.clone();
        let graph = Arc::clone(&graph);
        let registry = Arc::clone(&registry);
        pool.execute(move || {
            // A dropped receiver just means the caller gave up on the sweep.
            let _ = sender.send(year_statistics(&graph, &registry, year));
        });
    }
    drop(sender);

    let mut rows: Vec<YearlyStats> = receiver.iter().collect();
    rows.sort_by_key(|row| row.year);
    rows
}

// ---------------------------------------------------------------------------
// Rolling and windowed aggregates
// ---------------------------------------------------------------------------

/// Rolling mean wave velocity: one value per year from
/// `start + window_years` on, each covering the `window_years + 1` calendar
/// years ending in that year.
pub fn moving_average_velocities(
    graph: &WaveGraph,
    registry: &StationRegistry,
    window_years: i32,
    years: RangeInclusive<i32>,
) -> Vec<f64> {
    let (first, last) = (*years.start(), *years.end());
    (first + window_years..=last)
        .map(|year| {
            let start = year_bounds(year - window_years).0;
            let end = year_bounds(year).1;
            let sliced = select_time_interval(graph, start, end);
            mean(&wave_velocities(&sliced, registry))
        })
        .collect()
}

/// A windowed summary labelled by its date bounds, `"<start>_<end>"`.
#[derive(Debug, Clone)]
pub struct WindowSummary {
    pub label: String,
    pub summary: Summary,
}

fn window_starts(years: &RangeInclusive<i32>, period_years: i32) -> Vec<(i32, i32)> {
    let (first, last) = (*years.start(), *years.end());
    let mut windows = Vec::new();
    let mut year = first;
    while year <= last {
        let window_end = year + period_years - 1;
        if window_end > last {
            break;
        }
        windows.push((year, window_end));
        year += period_years;
    }
    windows
}

fn window_label(start_year: i32, end_year: i32) -> String {
    format!(
        "{}_{}",
        year_bounds(start_year).0.format("%Y-%m-%d"),
        year_bounds(end_year).1.format("%Y-%m-%d")
    )
}

/// Slope summaries per station pair over disjoint windows of
/// `period_years` years. An edge belongs to the window its upstream vertex
/// is dated in; pairs are keyed by station ids and windows without any edge
/// are omitted.
pub fn slope_summary_by_pair(
    graph: &WaveGraph,
    registry: &StationRegistry,
    period_years: i32,
    years: RangeInclusive<i32>,
) -> BTreeMap<(String, String), Vec<WindowSummary>> {
    // Group the edges by the station pair they connect.
    let mut by_pair: BTreeMap<(usize, usize), Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for (from, to, slope) in graph.edges() {
        by_pair
            .entry((from.station_index(), to.station_index()))
            .or_default()
            .push((from.date(), slope));
    }

    let windows = window_starts(&years, period_years);
    let mut result = BTreeMap::new();
    for ((up, down), dated_slopes) in by_pair {
        let mut summaries = Vec::new();
        for &(start_year, end_year) in &windows {
            let (start, _) = year_bounds(start_year);
            let (_, end) = year_bounds(end_year);
            let slopes: Vec<f64> = dated_slopes
                .iter()
                .filter(|(date, _)| *date >= start && *date <= end)
                .map(|(_, slope)| *slope)
                .collect();
            if slopes.is_empty() {
                continue;
            }
            summaries.push(WindowSummary {
                label: window_label(start_year, end_year),
                summary: Summary::of(&slopes),
            });
        }
        let key = (
            registry.get(up).id.clone(),
            registry.get(down).id.clone(),
        );
        result.insert(key, summaries);
    }
    result
}

/// Slope summaries along full waves inside a station interval, one summary
/// per disjoint window. Every edge traversed by a full start-to-end wave
/// contributes its slope; windows with no full wave summarise to NaN.
pub fn slope_summary_in_interval(
    graph: &WaveGraph,
    start_station: usize,
    end_station: usize,
    period_years: i32,
    years: RangeInclusive<i32>,
) -> Vec<WindowSummary> {
    window_starts(&years, period_years)
        .into_iter()
        .map(|(start_year, end_year)| {
            let sliced =
                select_time_interval(graph, year_bounds(start_year).0, year_bounds(end_year).1);
            let narrowed = select_only_in_interval(&sliced, start_station, end_station);

            let mut slopes = Vec::new();
            for wave in extract_waves(&narrowed) {
                let full = wave
                    .first()
                    .is_some_and(|n| n.station_index() == start_station)
                    && wave.last().is_some_and(|n| n.station_index() == end_station);
                if !full {
                    continue;
                }
                for hop in wave.windows(2) {
                    if let Some(slope) = narrowed.slope_of(hop[0], hop[1]) {
                        slopes.push(slope);
                    }
                }
            }
            WindowSummary {
                label: window_label(start_year, end_year),
                summary: Summary::of(&slopes),
            }
        })
        .collect()
}

/// Share of high-water vertices among all vertices per disjoint window.
/// A window without vertices yields NaN.
pub fn high_ratio(
    graph: &WaveGraph,
    period_years: i32,
    years: RangeInclusive<i32>,
) -> Vec<(String, f64)> {
    window_starts(&years, period_years)
        .into_iter()
        .map(|(start_year, end_year)| {
            let sliced =
                select_time_interval(graph, year_bounds(start_year).0, year_bounds(end_year).1);
            let total = sliced.vertex_count();
            let high = sliced
                .vertices()
                .filter(|(_, info)| info.class == LevelClass::High)
                .count();
            let ratio = if total == 0 {
                f64::NAN
            } else {
                high as f64 / total as f64
            };
            (window_label(start_year, end_year), ratio)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cleaned yearly waves
// ---------------------------------------------------------------------------

/// Waves attributed to one year. The extraction window is padded into the
/// neighbouring years (November 30th before, February 1st after, clamped at
/// the analysis bounds) so turn-of-year waves stay whole; a wave then counts
/// for year `y` iff none of its vertices is dated in `y - 1` and not all of
/// them are dated in `y + 1`.
pub fn cleaned_yearly_waves(
    graph: &WaveGraph,
    year: i32,
    bounds: RangeInclusive<i32>,
) -> Vec<FloodWave> {
    let start = if year == *bounds.start() {
        year_bounds(year).0
    } else {
        NaiveDate::from_ymd_opt(year - 1, 11, 30).expect("November 30th exists in every year")
    };
    let end = if year == *bounds.end() {
        year_bounds(year).1
    } else {
        NaiveDate::from_ymd_opt(year + 1, 2, 1).expect("February 1st exists in every year")
    };

    let sliced = select_time_interval(graph, start, end);
    extract_waves(&sliced)
        .into_iter()
        .filter(|wave| {
            let touches_previous = wave.iter().any(|node| node.date().year() == year - 1);
            let all_in_next = wave.iter().all(|node| node.date().year() == year + 1);
            !touches_previous && !all_in_next
        })
        .collect()
}

/// Number of cleaned waves per year over the whole range.
pub fn yearly_wave_counts(graph: &WaveGraph, years: RangeInclusive<i32>) -> Vec<usize> {
    years
        .clone()
        .map(|year| cleaned_yearly_waves(graph, year, years.clone()).len())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
