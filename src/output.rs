//! Output formatting and persistence for dashboard tables.
//!
//! Supports JSON on stdout, JSON reports (optionally gzip-compressed), and
//! one CSV file per table.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};

use crate::dashboard::DashboardReport;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes a value to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

/// Writes the full report as JSON to `path`, gzip-compressed when `gzip` is set.
pub fn write_report(path: &Path, report: &DashboardReport, gzip: bool) -> Result<()> {
    let body = serde_json::to_vec_pretty(report)?;

    let bytes = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body)?;
        encoder.finish()?
    } else {
        body
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), bytes = bytes.len(), gzip, "Report written");
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing any existing file.
///
/// The header row is taken from the field names of `T`; an empty table
/// produces an empty file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes every table of `report` into `dir` as `<table>.csv`.
pub fn write_tables(dir: &Path, report: &DashboardReport) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    write_table(&dir.join("weekly_workforce.csv"), &report.weekly_workforce)?;
    write_table(
        &dir.join("weekly_workforce_by_role.csv"),
        &report.weekly_workforce_by_role,
    )?;
    write_table(&dir.join("workforce_summaries.csv"), &report.workforce_summaries)?;
    write_table(&dir.join("area_split.csv"), &report.area_split)?;
    write_table(&dir.join("role_distribution.csv"), &report.role_distribution)?;
    write_table(&dir.join("comparison.csv"), &report.comparison.rows())?;
    write_table(&dir.join("comparison_stats.csv"), &report.comparison_stats)?;
    write_table(&dir.join("skipped_rows.csv"), &report.summary.skipped)?;

    info!(dir = %dir.display(), "CSV tables written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::dashboard::{Dashboard, ViewSelection};
    use flate2::read::GzDecoder;
    use std::env;
    use std::io::Read;
    use std::path::PathBuf;

    const EXPORT: &str = "\
Contractor,Person,StartTime,EndTime,Area,Role
Allelys,John Smith,13/06/2024 11:27,13/06/2024 11:39,Site,Operative
Allelys,John Smith,13/06/2024 11:39,13/06/2024 13:08,Welfare,Operative
Allelys,Nobody,,,Site,Operative
";

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn report() -> DashboardReport {
        Dashboard::load(EXPORT, &AnalyzerConfig::default())
            .unwrap()
            .report(&ViewSelection::default())
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report().area_totals).unwrap();
    }

    #[test]
    fn test_write_report_plain_json() {
        let path = temp_path("workforce_analyzer_test_report.json");
        let _ = fs::remove_file(&path);

        write_report(&path, &report(), false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["rows_skipped"], 1);
        assert_eq!(value["summary"]["skip_reasons"]["unparseable_start"], 1);
        assert_eq!(value["weekly_workforce"][0]["week_start"], "2024-06-10");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_report_gzip() {
        let path = temp_path("workforce_analyzer_test_report.json.gz");
        let _ = fs::remove_file(&path);

        write_report(&path, &report(), true).unwrap();

        let mut decoder = GzDecoder::new(File::open(&path).unwrap());
        let mut json = String::new();
        decoder.read_to_string(&mut json).unwrap();
        assert!(json.contains("\"area_totals\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_table_writes_header_once() {
        let path = temp_path("workforce_analyzer_test_weekly.csv");
        let _ = fs::remove_file(&path);

        let report = report();
        write_table(&path, &report.area_split).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("contractor,week_start,date,site_minutes"));
        assert!(lines[1].starts_with("Allelys,,,12,89,0,"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_tables_creates_every_file() {
        let dir = temp_path("workforce_analyzer_test_tables");
        let _ = fs::remove_dir_all(&dir);

        write_tables(&dir, &report()).unwrap();

        for name in [
            "weekly_workforce.csv",
            "weekly_workforce_by_role.csv",
            "workforce_summaries.csv",
            "area_split.csv",
            "role_distribution.csv",
            "comparison.csv",
            "comparison_stats.csv",
            "skipped_rows.csv",
        ] {
            assert!(dir.join(name).exists(), "missing {name}");
        }
        let skipped = fs::read_to_string(dir.join("skipped_rows.csv")).unwrap();
        assert!(skipped.contains("3,unparseable_start"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
