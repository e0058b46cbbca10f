//! Linking peaks of adjacent stations into wave continuations.
//!
//! A peak at the upstream station continues to every downstream peak dated
//! inside the upstream station's tolerance window: `backward_days` before the
//! upstream crest (a downstream gauge occasionally crests first on flat
//! reaches) through `forward_days` after it. Branching is expected — one
//! upstream crest may fan out to several downstream candidates and several
//! upstream crests may point at the same downstream one; nothing is merged.

use std::collections::BTreeMap;

use chrono::Days;

use crate::model::{Peak, PeakLink};
use crate::stations::Station;

// ---------------------------------------------------------------------------
// Slope
// ---------------------------------------------------------------------------

/// Water-surface slope between two gauge readings in cm/km.
///
/// Levels are corrected by the station null points to a common datum before
/// differencing; the denominator is the downstream run in km, strictly
/// positive because river kilometres decrease downstream.
pub fn slope(upstream: &Station, downstream: &Station, upstream_level: f64, downstream_level: f64) -> f64 {
    let corrected_up = upstream_level + upstream.null_point;
    let corrected_down = downstream_level + downstream.null_point;
    (corrected_down - corrected_up) / (upstream.river_km - downstream.river_km)
}

// ---------------------------------------------------------------------------
// Linking
// ---------------------------------------------------------------------------

/// Produces every link between an adjacent station pair's peaks.
///
/// Either side having no peaks is a normal outcome and yields no links.
pub fn link_adjacent(
    upstream: &Station,
    downstream: &Station,
    upstream_peaks: &[Peak],
    downstream_peaks: &[Peak],
) -> Vec<PeakLink> {
    let mut links = Vec::new();
    for up in upstream_peaks {
        let earliest = up.date - Days::new(upstream.backward_days as u64);
        let latest = up.date + Days::new(upstream.forward_days as u64);

        for down in downstream_peaks {
            if down.date < earliest || down.date > latest {
                continue;
            }
            links.push(PeakLink {
                from_date: up.date,
                to_date: down.date,
                slope: slope(upstream, downstream, up.level, down.level),
            });
        }
    }
    links
}

// ---------------------------------------------------------------------------
// Edge listing
// ---------------------------------------------------------------------------

/// The per-pair edge listing: upstream `YYYY-MM-DD` date to the parallel
/// lists of downstream dates and slopes.
pub fn edge_listing(links: &[PeakLink]) -> BTreeMap<String, (Vec<String>, Vec<f64>)> {
    let mut listing: BTreeMap<String, (Vec<String>, Vec<f64>)> = BTreeMap::new();
    for link in links {
        let entry = listing
            .entry(link.from_date.format("%Y-%m-%d").to_string())
            .or_default();
        entry.0.push(link.to_date.format("%Y-%m-%d").to_string());
        entry.1.push(link.slope);
    }
    listing
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LevelClass;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn station(id: &str, river_km: f64, null_point: f64, backward: u32, forward: u32) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            river_km,
            null_point,
            level_threshold: 500.0,
            backward_days: backward,
            forward_days: forward,
            lifetime: (date("2000-01-01"), date("2019-12-31")),
        }
    }

    fn peak(day: &str, level: f64) -> Peak {
        Peak {
            date: date(day),
            level,
            class: LevelClass::Low,
        }
    }

    #[test]
    fn test_one_upstream_crest_fans_out_to_every_candidate() {
        let a = station("a", 100.0, 0.0, 0, 2);
        let b = station("b", 80.0, 0.0, 0, 2);
        let links = link_adjacent(
            &a,
            &b,
            &[peak("2000-01-10", 100.0)],
            &[
                peak("2000-01-10", 120.0),
                peak("2000-01-11", 130.0),
                peak("2000-01-12", 140.0),
            ],
        );
        assert_eq!(links.len(), 3, "all three downstream dates fall in [+0, +2]");
        assert_eq!(links[0].slope, (120.0 - 100.0) / 20.0);
        assert_eq!(links[1].slope, (130.0 - 100.0) / 20.0);
        assert_eq!(links[2].slope, (140.0 - 100.0) / 20.0);
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let a = station("a", 100.0, 0.0, 1, 1);
        let b = station("b", 80.0, 0.0, 0, 2);
        let links = link_adjacent(
            &a,
            &b,
            &[peak("2000-01-10", 100.0)],
            &[
                peak("2000-01-08", 90.0),
                peak("2000-01-09", 95.0),
                peak("2000-01-11", 105.0),
                peak("2000-01-12", 110.0),
            ],
        );
        let to_dates: Vec<_> = links.iter().map(|l| l.to_date).collect();
        assert_eq!(
            to_dates,
            vec![date("2000-01-09"), date("2000-01-11")],
            "exactly one day back and one day forward are admitted"
        );
    }

    #[test]
    fn test_two_upstream_crests_may_share_a_downstream_one() {
        let a = station("a", 100.0, 0.0, 0, 3);
        let b = station("b", 80.0, 0.0, 0, 2);
        let links = link_adjacent(
            &a,
            &b,
            &[peak("2000-01-10", 100.0), peak("2000-01-12", 90.0)],
            &[peak("2000-01-13", 95.0)],
        );
        assert_eq!(links.len(), 2, "no deduplication between upstream crests");
        assert_eq!(links[0].from_date, date("2000-01-10"));
        assert_eq!(links[1].from_date, date("2000-01-12"));
    }

    #[test]
    fn test_null_points_shift_levels_to_a_common_datum() {
        let a = station("a", 100.0, 7300.0, 0, 2);
        let b = station("b", 80.0, 7450.0, 0, 2);
        let links = link_adjacent(&a, &b, &[peak("2000-01-10", 100.0)], &[peak("2000-01-11", 80.0)]);
        let expected = ((80.0 + 7450.0) - (100.0 + 7300.0)) / 20.0;
        assert_eq!(links[0].slope, expected);
    }

    #[test]
    fn test_peakless_side_contributes_no_links() {
        let a = station("a", 100.0, 0.0, 0, 2);
        let b = station("b", 80.0, 0.0, 0, 2);
        assert!(link_adjacent(&a, &b, &[], &[peak("2000-01-10", 1.0)]).is_empty());
        assert!(link_adjacent(&a, &b, &[peak("2000-01-10", 1.0)], &[]).is_empty());
    }

    #[test]
    fn test_edge_listing_groups_by_upstream_date() {
        let a = station("a", 100.0, 0.0, 0, 2);
        let b = station("b", 80.0, 0.0, 0, 2);
        let links = link_adjacent(
            &a,
            &b,
            &[peak("2000-01-10", 100.0)],
            &[peak("2000-01-10", 120.0), peak("2000-01-11", 130.0)],
        );
        let listing = edge_listing(&links);
        let entry = listing.get("2000-01-10").expect("upstream date keyed");
        assert_eq!(entry.0, vec!["2000-01-10", "2000-01-11"]);
        assert_eq!(entry.1, vec![1.0, 1.5]);
    }
}
