//! CLI entry point for the Contractor Workforce Analyzer.
//!
//! Provides subcommands for inspecting an ingestion, printing each dashboard
//! table, and writing the full report as JSON and CSV.

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use workforce_analyzer::analyzers::{self, AreaGrouping, ContractorScope};
use workforce_analyzer::config::{AnalyzerConfig, parse_delimiter, parse_weekday};
use workforce_analyzer::dashboard::{Dashboard, ViewSelection};
use workforce_analyzer::output::{print_json, write_report, write_tables};

#[derive(Parser)]
#[command(name = "workforce_analyzer")]
#[command(about = "Aggregates contractor time-tracking exports for workforce dashboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// CSV export from the time-tracking system
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// JSON config file (falls back to $WORKFORCE_CONFIG)
    #[arg(long)]
    config: Option<String>,

    /// Field delimiter; sniffed from the header line when omitted
    #[arg(long)]
    delimiter: Option<String>,

    /// The export has no header row; columns follow the standard export layout
    #[arg(long, default_value_t = false)]
    no_headers: bool,

    /// First day of the week used for weekly buckets
    #[arg(long, value_parser = parse_weekday)]
    week_start: Option<Weekday>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Contractor,
    Week,
    ContractorWeek,
    Day,
}

impl From<GroupBy> for AreaGrouping {
    fn from(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Contractor => AreaGrouping::Contractor,
            GroupBy::Week => AreaGrouping::Week,
            GroupBy::ContractorWeek => AreaGrouping::ContractorWeek,
            GroupBy::Day => AreaGrouping::Day,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a file and print the row counts and skip reasons
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Distinct workers per week and contractor
    Weekly {
        #[command(flatten)]
        input: InputArgs,

        /// Restrict to one contractor
        #[arg(short, long)]
        contractor: Option<String>,

        /// Break each week down by role
        #[arg(long, default_value_t = false)]
        by_role: bool,
    },
    /// Site vs. welfare minutes and productive ratio
    Area {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, value_enum, default_value_t = GroupBy::Contractor)]
        group_by: GroupBy,

        /// Restrict to one contractor
        #[arg(short, long)]
        contractor: Option<String>,
    },
    /// Distinct workers per role
    Roles {
        #[command(flatten)]
        input: InputArgs,

        /// Restrict to one contractor
        #[arg(short, long)]
        contractor: Option<String>,
    },
    /// Weekly headcount of several contractors on a shared week axis
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Contractor to include (repeatable); defaults to the first three in the file
        #[arg(short, long)]
        contractor: Vec<String>,
    },
    /// Write every dashboard table as a JSON report and optional CSV files
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// JSON report path
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Gzip compress the JSON report
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Directory to write one CSV per table into
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Restrict per-contractor views to one contractor
        #[arg(short, long)]
        contractor: Option<String>,

        /// Contractor to compare (repeatable); defaults to the first three in the file
        #[arg(long)]
        compare: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = GroupBy::Contractor)]
        group_by: GroupBy,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/workforce_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("workforce_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { input } => {
            let dashboard = load_dashboard(&input)?;
            let summary = dashboard.summary();
            for skipped in &summary.skipped {
                warn!(row = skipped.row, reason = %skipped.reason, "Row skipped");
            }
            print_json(summary)?;
        }
        Commands::Weekly {
            input,
            contractor,
            by_role,
        } => {
            let dashboard = load_dashboard(&input)?;
            if let Some(name) = &contractor {
                let summary = analyzers::workforce_summary(dashboard.entries(), name);
                info!(
                    contractor = %summary.contractor,
                    peak_workers = summary.peak_workers,
                    average_workers = summary.average_workers,
                    role_count = summary.role_count,
                    "Workforce summary"
                );
            }
            let scope = ContractorScope::from_option(contractor);
            if by_role {
                print_json(&dashboard.weekly_workforce_by_role(&scope))?;
            } else {
                print_json(&dashboard.weekly_workforce(&scope))?;
            }
        }
        Commands::Area {
            input,
            group_by,
            contractor,
        } => {
            let dashboard = load_dashboard(&input)?;
            let scope = ContractorScope::from_option(contractor);
            let totals = analyzers::area_totals(dashboard.entries(), &scope);
            info!(
                site_minutes = totals.site_minutes,
                welfare_minutes = totals.welfare_minutes,
                other_minutes = totals.other_minutes,
                productive_ratio = totals.productive_ratio,
                "Area totals"
            );
            print_json(&dashboard.site_welfare_split(group_by.into(), &scope))?;
        }
        Commands::Roles { input, contractor } => {
            let dashboard = load_dashboard(&input)?;
            let scope = ContractorScope::from_option(contractor);
            print_json(&dashboard.role_distribution(&scope))?;
        }
        Commands::Compare { input, contractor } => {
            let dashboard = load_dashboard(&input)?;
            let selected = if contractor.is_empty() {
                dashboard.default_comparison()
            } else {
                contractor
            };
            let comparison = dashboard.contractor_comparison(&selected);
            for stats in analyzers::comparison_stats(&comparison) {
                info!(
                    contractor = %stats.contractor,
                    average_workers = stats.average_workers,
                    peak_workers = stats.peak_workers,
                    "Contractor statistics"
                );
            }
            print_json(&comparison)?;
        }
        Commands::Report {
            input,
            output,
            gzip,
            csv_dir,
            contractor,
            compare,
            group_by,
        } => {
            let dashboard = load_dashboard(&input)?;
            let selection = ViewSelection {
                contractor: ContractorScope::from_option(contractor),
                compare: if compare.is_empty() {
                    None
                } else {
                    Some(compare)
                },
                area_grouping: group_by.into(),
            };
            let report = dashboard.report(&selection);

            info!(
                rows_valid = report.summary.rows_valid,
                contractors = report.contractors.len(),
                compared = report.comparison.series.len(),
                "Report built"
            );

            write_report(&output, &report, gzip)?;
            if let Some(dir) = csv_dir {
                write_tables(&dir, &report)?;
            }
        }
    }

    Ok(())
}

/// Builds the ingestion config from the config file and CLI overrides.
fn load_config(input: &InputArgs) -> Result<AnalyzerConfig> {
    let path = input
        .config
        .clone()
        .or_else(|| std::env::var("WORKFORCE_CONFIG").ok());

    let mut config = match path {
        Some(path) => {
            info!(path = %path, "Loading config");
            AnalyzerConfig::load(&path)?
        }
        None => AnalyzerConfig::default(),
    };

    if let Some(delimiter) = &input.delimiter {
        config.delimiter = Some(parse_delimiter(delimiter)?);
    }
    if input.no_headers {
        config.has_headers = false;
    }
    if let Some(week_start) = input.week_start {
        config.week_start = week_start;
    }

    Ok(config)
}

/// Reads and ingests the input file.
#[tracing::instrument(skip(input), fields(file = %input.file.display()))]
fn load_dashboard(input: &InputArgs) -> Result<Dashboard> {
    let config = load_config(input)?;
    let content = std::fs::read(&input.file)
        .with_context(|| format!("failed to read {}", input.file.display()))?;

    let dashboard = Dashboard::load(&content, &config)
        .with_context(|| format!("failed to ingest {}", input.file.display()))?;

    let source = input
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.file.display().to_string());
    Ok(dashboard.with_source(source))
}
