use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::analysis::types::{NamedSeries, ScoreRecord, YearMean, YearScore};
use crate::analysis::utility::mean;
use crate::countries::CountryResolver;

/// Extracts the target's present scores in ascending year order, values untouched.
pub fn target_series(scores: &[ScoreRecord], target: u32) -> Vec<YearScore> {
    let mut series: Vec<YearScore> = scores
        .iter()
        .filter(|r| r.entity_code == target)
        .filter_map(|r| r.score.map(|score| YearScore { year: r.year, score }))
        .collect();
    series.sort_by_key(|p| p.year);
    series
}

/// Per-year mean score across `members`, excluding `target`.
///
/// Missing scores count toward neither sum nor denominator; a year whose
/// rows are all missing yields `mean_score: None`. Duplicate (entity, year)
/// rows simply contribute twice to that year's mean.
pub fn peer_average(
    scores: &[ScoreRecord],
    members: &BTreeSet<u32>,
    target: u32,
) -> Vec<YearMean> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

    for row in scores {
        if row.entity_code == target || !members.contains(&row.entity_code) {
            continue;
        }
        let values = by_year.entry(row.year).or_default();
        if let Some(score) = row.score {
            values.push(score as f64);
        }
    }

    debug!(years = by_year.len(), members = members.len(), "Peer average grouped");

    by_year
        .into_iter()
        .map(|(year, values)| YearMean {
            year,
            mean_score: mean(&values),
        })
        .collect()
}

/// One line per named peer, labelled through the resolver. Peers without data are skipped.
pub fn named_peer_series(
    scores: &[ScoreRecord],
    peers: &[u32],
    resolver: &dyn CountryResolver,
) -> Vec<NamedSeries> {
    peers
        .iter()
        .filter_map(|&code| {
            let points = target_series(scores, code);
            if points.is_empty() {
                debug!(code, "Named peer has no scores");
                return None;
            }
            let name = resolver
                .code_to_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string());
            Some(NamedSeries::from_scores(name, &points))
        })
        .collect()
}
