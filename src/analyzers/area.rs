use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analyzers::types::{AreaGrouping, AreaSplit, AreaTotals, ContractorScope};
use crate::analyzers::utility::{first_appearance, ratio};
use crate::entry::{Area, TimeEntry};

#[derive(Debug, Default, Clone, Copy)]
struct Minutes {
    site: u64,
    welfare: u64,
    other: u64,
}

impl Minutes {
    fn add(&mut self, area: &Area, minutes: u32) {
        let minutes = u64::from(minutes);
        match area {
            Area::Site => self.site += minutes,
            Area::Welfare => self.welfare += minutes,
            Area::Other(_) => self.other += minutes,
        }
    }

    fn productive_ratio(&self) -> f64 {
        ratio(self.site, self.site + self.welfare)
    }
}

/// Sums site, welfare and other minutes per group.
///
/// Entries without a resolvable duration are ignored. Rows are ordered by the
/// contractor's first appearance, then by date.
pub fn site_welfare_split(
    entries: &[TimeEntry],
    grouping: AreaGrouping,
    scope: &ContractorScope,
) -> Vec<AreaSplit> {
    let contractor_order = first_appearance(entries, |e| e.contractor.as_str());

    let mut groups: BTreeMap<(Option<usize>, Option<NaiveDate>), (Option<&str>, Minutes)> =
        BTreeMap::new();

    for entry in entries.iter().filter(|e| scope.includes(e)) {
        let Some(minutes) = entry.duration_minutes else {
            continue;
        };

        let contractor = match grouping {
            AreaGrouping::Contractor | AreaGrouping::ContractorWeek => {
                Some(entry.contractor.as_str())
            }
            AreaGrouping::Week | AreaGrouping::Day => None,
        };
        let date = match grouping {
            AreaGrouping::Contractor => None,
            AreaGrouping::Week | AreaGrouping::ContractorWeek => Some(entry.week_start),
            AreaGrouping::Day => Some(entry.start_time.date()),
        };
        let rank = contractor.map(|name| contractor_order[name]);

        groups
            .entry((rank, date))
            .or_insert_with(|| (contractor, Minutes::default()))
            .1
            .add(&entry.area, minutes);
    }

    groups
        .into_iter()
        .map(|((_, date), (contractor, minutes))| {
            let (week_start, date) = match grouping {
                AreaGrouping::Day => (None, date),
                _ => (date, None),
            };
            AreaSplit {
                contractor: contractor.map(str::to_string),
                week_start,
                date,
                site_minutes: minutes.site,
                welfare_minutes: minutes.welfare,
                other_minutes: minutes.other,
                productive_ratio: minutes.productive_ratio(),
            }
        })
        .collect()
}

/// Overall site/welfare minutes and percentages for a scope.
pub fn area_totals(entries: &[TimeEntry], scope: &ContractorScope) -> AreaTotals {
    let mut minutes = Minutes::default();
    for entry in entries.iter().filter(|e| scope.includes(e)) {
        if let Some(duration) = entry.duration_minutes {
            minutes.add(&entry.area, duration);
        }
    }

    let tracked = minutes.site + minutes.welfare;
    AreaTotals {
        site_minutes: minutes.site,
        welfare_minutes: minutes.welfare,
        other_minutes: minutes.other,
        productive_ratio: minutes.productive_ratio(),
        site_percent: ratio(minutes.site, tracked) * 100.0,
        welfare_percent: ratio(minutes.welfare, tracked) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::entry;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<TimeEntry> {
        vec![
            entry("Allelys", "John", "Operative", "Site", "13/06/2024 11:27", Some(12)),
            entry("Allelys", "John", "Operative", "Welfare", "13/06/2024 11:39", Some(89)),
            entry("Allelys", "John", "Operative", "Canteen", "14/06/2024 12:00", Some(15)),
            entry("Allelys", "Mary", "Operative", "Site", "18/06/2024 07:00", None),
            entry("Beta", "Zoe", "Labourer", "Site", "14/06/2024 08:00", Some(60)),
        ]
    }

    #[test]
    fn test_split_by_contractor() {
        let rows = site_welfare_split(&sample(), AreaGrouping::Contractor, &ContractorScope::All);

        assert_eq!(rows.len(), 2);
        let allelys = &rows[0];
        assert_eq!(allelys.contractor.as_deref(), Some("Allelys"));
        assert_eq!(allelys.site_minutes, 12);
        assert_eq!(allelys.welfare_minutes, 89);
        assert_eq!(allelys.other_minutes, 15);
        assert!((allelys.productive_ratio - 12.0 / 101.0).abs() < 1e-9);
        assert_eq!(allelys.week_start, None);

        assert_eq!(rows[1].contractor.as_deref(), Some("Beta"));
        assert_eq!(rows[1].productive_ratio, 1.0);
    }

    #[test]
    fn test_split_by_contractor_week() {
        let rows = site_welfare_split(
            &sample(),
            AreaGrouping::ContractorWeek,
            &ContractorScope::Only("Allelys".into()),
        );

        // Mary's week has no duration, so no row for 2024-06-17.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].week_start, Some(date(2024, 6, 10)));
        assert_eq!(rows[0].site_minutes, 12);
        assert_eq!(rows[0].welfare_minutes, 89);
    }

    #[test]
    fn test_split_by_day() {
        let rows = site_welfare_split(&sample(), AreaGrouping::Day, &ContractorScope::All);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, Some(date(2024, 6, 13)));
        assert_eq!(rows[0].contractor, None);
        assert_eq!(rows[1].date, Some(date(2024, 6, 14)));
        assert_eq!(rows[1].site_minutes, 60);
        assert_eq!(rows[1].other_minutes, 15);
    }

    #[test]
    fn test_zero_denominator_ratio_is_zero() {
        let entries = vec![entry("A", "B", "Role", "Gate", "13/06/2024 11:27", Some(30))];
        let rows = site_welfare_split(&entries, AreaGrouping::Week, &ContractorScope::All);

        assert_eq!(rows[0].productive_ratio, 0.0);
        assert_eq!(rows[0].other_minutes, 30);
    }

    #[test]
    fn test_empty_input() {
        assert!(site_welfare_split(&[], AreaGrouping::Week, &ContractorScope::All).is_empty());
        assert_eq!(area_totals(&[], &ContractorScope::All), AreaTotals::default());
    }

    #[test]
    fn test_area_totals() {
        let totals = area_totals(&sample(), &ContractorScope::All);

        assert_eq!(totals.site_minutes, 72);
        assert_eq!(totals.welfare_minutes, 89);
        assert_eq!(totals.other_minutes, 15);
        assert!((totals.site_percent + totals.welfare_percent - 100.0).abs() < 1e-9);
    }
}
