//! wavegraph: flood-wave reconstruction over a river's gauging stations.
//!
//! Takes the daily water-level series of the stations along one river,
//! finds the local crests at every station, links crests of adjacent
//! stations that are close enough in time, and reads flood waves off the
//! resulting directed acyclic graph.
//!
//! # Module structure
//!
//! ```text
//! wavegraph
//! ├── model      — shared data types (Peak, PeakLink, NodeId, WaveError, …)
//! ├── config     — analysis settings + station registry loader (stations.toml)
//! ├── stations   — validated ordered station registry
//! ├── series     — dense daily series with gaps
//! ├── ingest
//! │   ├── levels   — daily water-level table parsing
//! │   ├── metadata — station table, thresholds, existence intervals
//! │   └── fixtures (test only) — representative input payloads
//! ├── peaks      — centred-window crest detection + peak listing
//! ├── edges      — tolerance-window linking + slopes + edge listing
//! ├── graph      — the wave graph, components, node-link form
//! ├── builder    — lifetime-aware graph assembly from level tables
//! ├── selection  — topological selections (station, interval, class, time)
//! ├── waves      — flood-wave extraction (collapsed / expanded)
//! ├── analysis
//! │   ├── queries — wave counts, propagation, velocities, flood maps
//! │   └── stats   — yearly tables, windowed summaries, parallel sweeps
//! └── io         — JSON persistence helpers
//! ```
//!
//! The crate is a library: it neither downloads data nor renders figures,
//! and it installs no logger. Everything is deterministic given the inputs
//! and the configuration.

pub mod analysis;
pub mod builder;
pub mod config;
pub mod edges;
pub mod graph;
pub mod ingest;
pub mod io;
pub mod model;
pub mod peaks;
pub mod selection;
pub mod series;
pub mod stations;
pub mod waves;
