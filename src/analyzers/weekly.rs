use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::analyzers::types::{
    ContractorScope, WeeklyRoleWorkforce, WeeklyWorkforce, WorkforceSummary,
};
use crate::analyzers::utility::{first_appearance, mean};
use crate::entry::TimeEntry;

/// Counts distinct workers per `(week_start, contractor)`.
///
/// Rows are ordered by week, then by the contractor's first appearance in `entries`.
pub fn weekly_workforce(entries: &[TimeEntry], scope: &ContractorScope) -> Vec<WeeklyWorkforce> {
    let contractor_order = first_appearance(entries, |e| e.contractor.as_str());

    let mut groups: BTreeMap<(NaiveDate, usize), (&str, HashSet<&str>)> = BTreeMap::new();
    for entry in entries.iter().filter(|e| scope.includes(e)) {
        let rank = contractor_order[entry.contractor.as_str()];
        groups
            .entry((entry.week_start, rank))
            .or_insert_with(|| (entry.contractor.as_str(), HashSet::new()))
            .1
            .insert(entry.worker_name.as_str());
    }

    groups
        .into_iter()
        .map(|((week_start, _), (contractor, workers))| WeeklyWorkforce {
            week_start,
            contractor: contractor.to_string(),
            workers: workers.len(),
        })
        .collect()
}

/// Counts distinct workers per `(week_start, contractor, role)`.
///
/// Same ordering as [`weekly_workforce`], with roles in order of first appearance.
pub fn weekly_workforce_by_role(
    entries: &[TimeEntry],
    scope: &ContractorScope,
) -> Vec<WeeklyRoleWorkforce> {
    let contractor_order = first_appearance(entries, |e| e.contractor.as_str());
    let role_order = first_appearance(entries, |e| e.role.as_str());

    let mut groups: BTreeMap<(NaiveDate, usize, usize), (&TimeEntry, HashSet<&str>)> =
        BTreeMap::new();
    for entry in entries.iter().filter(|e| scope.includes(e)) {
        let key = (
            entry.week_start,
            contractor_order[entry.contractor.as_str()],
            role_order[entry.role.as_str()],
        );
        groups
            .entry(key)
            .or_insert_with(|| (entry, HashSet::new()))
            .1
            .insert(entry.worker_name.as_str());
    }

    groups
        .into_iter()
        .map(|((week_start, _, _), (first, workers))| WeeklyRoleWorkforce {
            week_start,
            contractor: first.contractor.clone(),
            role: first.role.clone(),
            workers: workers.len(),
        })
        .collect()
}

/// Peak and average weekly headcount for one contractor.
///
/// An unknown contractor yields an all-zero summary.
pub fn workforce_summary(entries: &[TimeEntry], contractor: &str) -> WorkforceSummary {
    let weekly = weekly_workforce(entries, &ContractorScope::Only(contractor.to_string()));
    let counts: Vec<f64> = weekly.iter().map(|row| row.workers as f64).collect();

    let role_count = entries
        .iter()
        .filter(|e| e.contractor == contractor)
        .map(|e| e.role.as_str())
        .collect::<HashSet<_>>()
        .len();

    WorkforceSummary {
        contractor: contractor.to_string(),
        peak_workers: weekly.iter().map(|row| row.workers).max().unwrap_or(0),
        average_workers: mean(&counts),
        weeks_active: weekly.len(),
        role_count,
    }
}
