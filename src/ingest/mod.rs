//! Parsers for the external collaborator formats.
//!
//! The analysis core never fetches anything itself; it consumes tables and
//! records produced elsewhere. Each format gets its own file:
//!
//! - `levels`   — semicolon-separated daily water-level table (one `Date`
//!   column plus one column per station, blank or non-numeric cells mark
//!   missing readings)
//! - `metadata` — station metadata table (filtered to one river), the
//!   level-threshold map and the station existence-interval records
//! - `fixtures` (test only) — representative payloads for the parsers

pub mod levels;
pub mod metadata;

#[cfg(test)]
pub mod fixtures;
