//! Representative input payloads for parser and pipeline tests.
//!
//! The fixtures describe a small three-station reach: "100" (upstream),
//! "80" and "60" (downstream), named after their river kilometres so the
//! expected graph geometry is readable straight from the test data. The
//! level table carries one flood wave that crests at the upper station on
//! Jan 3 and arrives at the lower station on Jan 6, plus a data gap at the
//! lower station on Jan 1.

/// stations.toml document matching the CSV/JSON fixtures below.
pub fn fixture_registry_toml() -> &'static str {
    r#"
window_radius = 2
start_date = "2000-01-01"
end_date = "2000-12-31"

[[station]]
id = "100"
name = "Upper"
river_km = 100.0
null_point = 0.0
level_threshold = 500.0
backward_days = 0
forward_days = 2
lifetime = { start = "2000-01-01", end = "2019-12-31" }

[[station]]
id = "80"
name = "Middle"
river_km = 80.0
null_point = 0.0
level_threshold = 500.0
backward_days = 0
forward_days = 2
lifetime = { start = "2000-01-01", end = "2019-12-31" }

[[station]]
id = "60"
name = "Lower"
river_km = 60.0
null_point = 0.0
level_threshold = 25.0
backward_days = 0
forward_days = 2
lifetime = { start = "2000-01-01", end = "2019-12-31" }
"#
}

/// Daily level table: one wave travelling 100 -> 80 -> 60, with a missing
/// reading at station 60 on Jan 1.
pub fn fixture_levels_csv() -> &'static str {
    "\
Date;100;80;60
2000-01-01;10;8;
2000-01-02;20;9;7
2000-01-03;30;10;8
2000-01-04;20;25;9
2000-01-05;10;24;10
2000-01-06;9;12;30
2000-01-07;8;11;29
2000-01-08;7;10;28
"
}

/// Station metadata table carrying two rivers and one station without an
/// `h_table` marker; filtering to "Tisza" must keep exactly 100, 80, 60.
pub fn fixture_metadata_csv() -> &'static str {
    "\
id;river;river_km;null_point;station_name;h_table
80;Tisza;80.0;0.0;Middle;x
100;Tisza;100.0;0.0;Upper;x
999;Maros;50.0;12.5;Elsewhere;x
60;Tisza;60.0;0.0;Lower;x
55;Tisza;55.0;0.0;Untabled;
"
}

/// Level-threshold map (the low/high boundary per station).
pub fn fixture_thresholds_json() -> &'static str {
    r#"{ "100": 500.0, "80": 500.0, "60": 25.0 }"#
}

/// Station existence intervals.
pub fn fixture_lifetimes_json() -> &'static str {
    r#"{
        "100": { "start": "2000-01-01", "end": "2019-12-31" },
        "80":  { "start": "2000-01-01", "end": "2019-12-31" },
        "60":  { "start": "2000-01-01", "end": "2019-12-31" }
    }"#
}
