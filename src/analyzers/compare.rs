use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::analyzers::types::{ContractorComparison, ContractorSeries, ContractorStats, WeekCount};
use crate::analyzers::utility::{mean, week_axis};
use crate::entry::TimeEntry;

/// Weekly distinct-worker series for the `selected` contractors on a shared axis.
///
/// The axis runs from the earliest to the latest week in which any selected
/// contractor is active, gaps included, and every series has one point per
/// axis week (0 when inactive). Series follow selection order; repeated names
/// are dropped.
pub fn contractor_comparison(entries: &[TimeEntry], selected: &[String]) -> ContractorComparison {
    let mut names: Vec<&str> = Vec::new();
    for name in selected {
        if !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }

    let mut active: HashMap<&str, BTreeMap<NaiveDate, HashSet<&str>>> = HashMap::new();
    for entry in entries {
        let contractor = entry.contractor.as_str();
        if !names.contains(&contractor) {
            continue;
        }
        active
            .entry(contractor)
            .or_default()
            .entry(entry.week_start)
            .or_default()
            .insert(entry.worker_name.as_str());
    }

    let first = active.values().filter_map(|weeks| weeks.keys().next()).min();
    let last = active.values().filter_map(|weeks| weeks.keys().next_back()).max();
    let weeks = match (first, last) {
        (Some(first), Some(last)) => week_axis(*first, *last),
        _ => Vec::new(),
    };

    let series = names
        .into_iter()
        .map(|name| {
            let counts = active.get(name);
            let points = weeks
                .iter()
                .map(|week_start| WeekCount {
                    week_start: *week_start,
                    workers: counts
                        .and_then(|by_week| by_week.get(week_start))
                        .map_or(0, HashSet::len),
                })
                .collect();
            ContractorSeries {
                contractor: name.to_string(),
                points,
            }
        })
        .collect();

    ContractorComparison { weeks, series }
}

/// Average (over the shared axis) and peak weekly headcount per contractor,
/// highest peak first.
pub fn comparison_stats(comparison: &ContractorComparison) -> Vec<ContractorStats> {
    let mut stats: Vec<ContractorStats> = comparison
        .series
        .iter()
        .map(|series| {
            let counts: Vec<f64> = series.points.iter().map(|p| p.workers as f64).collect();
            ContractorStats {
                contractor: series.contractor.clone(),
                average_workers: mean(&counts),
                peak_workers: series.points.iter().map(|p| p.workers).max().unwrap_or(0),
            }
        })
        .collect();
    stats.sort_by(|a, b| b.peak_workers.cmp(&a.peak_workers));
    stats
}
