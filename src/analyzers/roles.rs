use std::collections::{HashMap, HashSet};

use crate::analyzers::types::{ContractorScope, RoleCount};
use crate::entry::TimeEntry;

/// Counts distinct workers per role within `scope`.
///
/// A worker seen under several roles is counted once in each of them. Rows are
/// ordered by worker count descending, ties by the role's first appearance.
pub fn role_distribution(entries: &[TimeEntry], scope: &ContractorScope) -> Vec<RoleCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut workers: HashMap<&str, HashSet<&str>> = HashMap::new();

    for entry in entries.iter().filter(|e| scope.includes(e)) {
        let role = entry.role.as_str();
        let set = workers.entry(role).or_insert_with(|| {
            order.push(role);
            HashSet::new()
        });
        set.insert(entry.worker_name.as_str());
    }

    let mut counts: Vec<RoleCount> = order
        .into_iter()
        .map(|role| RoleCount {
            role: role.to_string(),
            workers: workers[role].len(),
        })
        .collect();
    counts.sort_by(|a, b| b.workers.cmp(&a.workers));
    counts
}
