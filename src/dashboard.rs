//! Session-scoped view over one uploaded export.
//!
//! A [`Dashboard`] owns the entries parsed from a single file and recomputes
//! every table from them for whatever [`ViewSelection`] the caller passes in.
//! Loading another file means building another `Dashboard`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::{
    self, AreaGrouping, AreaSplit, AreaTotals, ContractorComparison, ContractorScope,
    ContractorStats, RoleCount, WeeklyRoleWorkforce, WeeklyWorkforce, WorkforceSummary,
};
use crate::config::AnalyzerConfig;
use crate::entry::TimeEntry;
use crate::errors::IngestError;
use crate::parser::{IngestSummary, Ingested, ingest};

/// Number of contractors compared when the caller does not pick any.
pub const DEFAULT_COMPARISON_SIZE: usize = 3;

/// Filter state chosen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSelection {
    pub contractor: ContractorScope,
    /// `None` compares the first few contractors in source order.
    pub compare: Option<Vec<String>>,
    pub area_grouping: AreaGrouping,
}

/// Every table for one selection, ready to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub source: Option<String>,
    pub summary: IngestSummary,
    pub contractors: Vec<String>,
    pub selection: ViewSelection,
    pub weekly_workforce: Vec<WeeklyWorkforce>,
    pub weekly_workforce_by_role: Vec<WeeklyRoleWorkforce>,
    pub workforce_summaries: Vec<WorkforceSummary>,
    pub area_split: Vec<AreaSplit>,
    pub area_totals: AreaTotals,
    pub role_distribution: Vec<RoleCount>,
    pub comparison: ContractorComparison,
    pub comparison_stats: Vec<ContractorStats>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    source: Option<String>,
    entries: Vec<TimeEntry>,
    summary: IngestSummary,
}

impl Dashboard {
    /// Parses `content` and keeps the result for later views.
    pub fn load<B>(content: &B, config: &AnalyzerConfig) -> Result<Self, IngestError>
    where
        B: AsRef<[u8]> + ?Sized,
    {
        Ok(Self::from(ingest(content, config)?))
    }

    /// Labels the dashboard with the name of the file it came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    /// Contractor names in order of first appearance.
    pub fn contractors(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.contractor) {
                names.push(entry.contractor.clone());
            }
        }
        names
    }

    pub fn default_comparison(&self) -> Vec<String> {
        self.contractors()
            .into_iter()
            .take(DEFAULT_COMPARISON_SIZE)
            .collect()
    }

    pub fn weekly_workforce(&self, scope: &ContractorScope) -> Vec<WeeklyWorkforce> {
        analyzers::weekly_workforce(&self.entries, scope)
    }

    pub fn weekly_workforce_by_role(&self, scope: &ContractorScope) -> Vec<WeeklyRoleWorkforce> {
        analyzers::weekly_workforce_by_role(&self.entries, scope)
    }

    pub fn site_welfare_split(
        &self,
        grouping: AreaGrouping,
        scope: &ContractorScope,
    ) -> Vec<AreaSplit> {
        analyzers::site_welfare_split(&self.entries, grouping, scope)
    }

    pub fn role_distribution(&self, scope: &ContractorScope) -> Vec<RoleCount> {
        analyzers::role_distribution(&self.entries, scope)
    }

    pub fn contractor_comparison(&self, selected: &[String]) -> ContractorComparison {
        analyzers::contractor_comparison(&self.entries, selected)
    }

    /// Computes every table for `selection`.
    pub fn report(&self, selection: &ViewSelection) -> DashboardReport {
        let scope = &selection.contractor;
        let compared = selection
            .compare
            .clone()
            .unwrap_or_else(|| self.default_comparison());
        debug!(?scope, compared = compared.len(), "Building dashboard report");

        let contractors = self.contractors();
        let workforce_summaries = contractors
            .iter()
            .filter(|name| match scope {
                ContractorScope::All => true,
                ContractorScope::Only(only) => *name == only,
            })
            .map(|name| analyzers::workforce_summary(&self.entries, name))
            .collect();

        let comparison = self.contractor_comparison(&compared);
        let comparison_stats = analyzers::comparison_stats(&comparison);

        DashboardReport {
            source: self.source.clone(),
            summary: self.summary.clone(),
            contractors,
            selection: ViewSelection {
                compare: Some(compared),
                ..selection.clone()
            },
            weekly_workforce: self.weekly_workforce(scope),
            weekly_workforce_by_role: self.weekly_workforce_by_role(scope),
            workforce_summaries,
            area_split: self.site_welfare_split(selection.area_grouping, scope),
            area_totals: analyzers::area_totals(&self.entries, scope),
            role_distribution: self.role_distribution(scope),
            comparison,
            comparison_stats,
        }
    }
}

impl From<Ingested> for Dashboard {
    fn from(ingested: Ingested) -> Self {
        Self {
            source: None,
            entries: ingested.entries,
            summary: ingested.summary,
        }
    }
}
