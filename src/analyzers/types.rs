//! Result tables handed to the presentation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entry::TimeEntry;

/// Which contractors a view covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractorScope {
    #[default]
    All,
    Only(String),
}

impl ContractorScope {
    pub fn from_option(contractor: Option<String>) -> Self {
        contractor.map_or(ContractorScope::All, ContractorScope::Only)
    }

    pub fn includes(&self, entry: &TimeEntry) -> bool {
        match self {
            ContractorScope::All => true,
            ContractorScope::Only(name) => entry.contractor == *name,
        }
    }
}

/// Distinct workers for one contractor in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyWorkforce {
    pub week_start: NaiveDate,
    pub contractor: String,
    pub workers: usize,
}

/// Distinct workers for one contractor and role in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyRoleWorkforce {
    pub week_start: NaiveDate,
    pub contractor: String,
    pub role: String,
    pub workers: usize,
}

/// Headline numbers for one contractor across all weeks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkforceSummary {
    pub contractor: String,
    pub peak_workers: usize,
    pub average_workers: f64,
    pub weeks_active: usize,
    pub role_count: usize,
}

/// How site/welfare minutes are bucketed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaGrouping {
    #[default]
    Contractor,
    Week,
    ContractorWeek,
    Day,
}

/// Site/welfare split for one group. Unused key parts are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSplit {
    pub contractor: Option<String>,
    pub week_start: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub site_minutes: u64,
    pub welfare_minutes: u64,
    pub other_minutes: u64,
    pub productive_ratio: f64,
}

/// Overall site/welfare minutes for a scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaTotals {
    pub site_minutes: u64,
    pub welfare_minutes: u64,
    pub other_minutes: u64,
    pub productive_ratio: f64,
    pub site_percent: f64,
    pub welfare_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekCount {
    pub week_start: NaiveDate,
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractorSeries {
    pub contractor: String,
    pub points: Vec<WeekCount>,
}

/// Weekly series for the selected contractors on one shared week axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractorComparison {
    pub weeks: Vec<NaiveDate>,
    pub series: Vec<ContractorSeries>,
}

impl ContractorComparison {
    /// Flattens the series into week-major rows for tabular output.
    pub fn rows(&self) -> Vec<WeeklyWorkforce> {
        let mut rows = Vec::with_capacity(self.weeks.len() * self.series.len());
        for (i, week_start) in self.weeks.iter().enumerate() {
            for series in &self.series {
                rows.push(WeeklyWorkforce {
                    week_start: *week_start,
                    contractor: series.contractor.clone(),
                    workers: series.points[i].workers,
                });
            }
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorStats {
    pub contractor: String,
    pub average_workers: f64,
    pub peak_workers: usize,
}
