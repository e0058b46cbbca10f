//! Analysis over assembled flood-wave graphs.
//!
//! Two layers:
//!
//! - `queries` — direct graph questions: wave counts between two stations,
//!   unfinished waves, propagation times, velocities, flood maps
//! - `stats`   — statistical tables over years and year windows: yearly wave
//!   and vertex-class counts, velocity and slope summaries, high-water
//!   ratios, with a thread-pool variant for long year sweeps

pub mod queries;
pub mod stats;
