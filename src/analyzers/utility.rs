use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::entry::TimeEntry;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `part / total`, or 0.0 when `total` is zero.
pub fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Every week start from `first` to `last` inclusive, in 7-day steps.
pub fn week_axis(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut weeks = Vec::new();
    let mut week = first;
    while week <= last {
        weeks.push(week);
        week = week + Duration::days(7);
    }
    weeks
}

/// Position of each distinct value of `key` in order of first appearance.
pub fn first_appearance<'a, F>(entries: &'a [TimeEntry], key: F) -> HashMap<&'a str, usize>
where
    F: Fn(&'a TimeEntry) -> &'a str,
{
    let mut order = HashMap::new();
    for entry in entries {
        let next = order.len();
        order.entry(key(entry)).or_insert(next);
    }
    order
}
