//! CSV ingestion for time-tracking exports.
//!
//! Resolves the header once, then turns every data row into a [`TimeEntry`]
//! or a counted [`SkipReason`]. Only an unusable header aborts the run.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::columns::{ColumnMap, Field, positional_headers};
use crate::config::AnalyzerConfig;
use crate::entry::{Area, TimeEntry, minutes_between, week_start};
use crate::errors::{IngestError, SkipReason};

/// A data row that did not survive validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based position among the data rows (the header is not counted).
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_valid: usize,
    pub rows_skipped: usize,
    pub skip_reasons: BTreeMap<SkipReason, usize>,
    pub skipped: Vec<SkippedRow>,
}

impl IngestSummary {
    fn record_valid(&mut self) {
        self.rows_read += 1;
        self.rows_valid += 1;
    }

    fn record_skip(&mut self, row: usize, reason: SkipReason) {
        self.rows_read += 1;
        self.rows_skipped += 1;
        *self.skip_reasons.entry(reason).or_insert(0) += 1;
        self.skipped.push(SkippedRow { row, reason });
    }
}

/// Entries in source order plus the ingestion summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub entries: Vec<TimeEntry>,
    pub summary: IngestSummary,
}

/// Parses a full CSV export from raw bytes.
///
/// Data rows that are not valid UTF-8 are skipped as
/// [`SkipReason::MalformedRecord`]; the rest of the file is still read.
///
/// # Errors
///
/// Returns an error if there is no header row, the header cannot be read, or a
/// required column (contractor, worker, start time) cannot be resolved.
#[tracing::instrument(skip(content, config), fields(bytes = content.as_ref().len()))]
pub fn ingest<B>(content: &B, config: &AnalyzerConfig) -> Result<Ingested, IngestError>
where
    B: AsRef<[u8]> + ?Sized,
{
    let content = content.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| sniff_delimiter(content));
    debug!(delimiter = %(delimiter as char), has_headers = config.has_headers, "Reading CSV");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content);
    let mut records = reader.records();

    let (headers, pending) = match records.next() {
        None => return Err(IngestError::EmptyInput),
        Some(Err(source)) => return Err(IngestError::Csv { source }),
        Some(Ok(first)) if config.has_headers => {
            (first.iter().map(str::to_string).collect::<Vec<_>>(), None)
        }
        Some(Ok(first)) => (positional_headers(first.len()), Some(Ok(first))),
    };

    let columns = ColumnMap::resolve(&headers, &config.columns)?;
    debug!(?columns, "Resolved header columns");

    let mut entries = Vec::new();
    let mut summary = IngestSummary::default();

    for (index, result) in pending.into_iter().chain(records).enumerate() {
        let row = index + 1;
        let parsed = match result {
            Ok(record) => parse_row(&record, &columns, config),
            Err(err) => {
                debug!(row, error = %err, "Undecodable CSV record");
                Err(SkipReason::MalformedRecord)
            }
        };

        match parsed {
            Ok(entry) => {
                summary.record_valid();
                entries.push(entry);
            }
            Err(reason) => {
                debug!(row, %reason, "Skipping row");
                summary.record_skip(row, reason);
            }
        }
    }

    if summary.rows_skipped > 0 {
        warn!(
            rows_skipped = summary.rows_skipped,
            reasons = ?summary.skip_reasons,
            "Some rows were skipped"
        );
    }
    info!(
        rows_read = summary.rows_read,
        rows_valid = summary.rows_valid,
        rows_skipped = summary.rows_skipped,
        "Ingestion complete"
    );

    Ok(Ingested { entries, summary })
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnMap,
    config: &AnalyzerConfig,
) -> Result<TimeEntry, SkipReason> {
    let contractor = columns
        .get(record, Field::Contractor)
        .ok_or(SkipReason::MissingContractor)?;
    let worker_name = columns
        .get(record, Field::Worker)
        .ok_or(SkipReason::MissingWorker)?;
    let start_time = columns
        .get(record, Field::Start)
        .and_then(|raw| parse_timestamp(raw, &config.timestamp_formats))
        .ok_or(SkipReason::UnparseableStart)?;

    let end_time = columns
        .get(record, Field::End)
        .and_then(|raw| parse_timestamp(raw, &config.timestamp_formats));

    let duration_minutes = columns
        .get(record, Field::Duration)
        .and_then(parse_duration)
        .or_else(|| end_time.and_then(|end| minutes_between(start_time, end)));

    let role = columns
        .get(record, Field::Role)
        .unwrap_or(config.unknown_role.as_str())
        .to_string();
    let area = Area::parse(columns.get(record, Field::Area).unwrap_or(""));

    Ok(TimeEntry {
        contractor: contractor.to_string(),
        worker_name: worker_name.to_string(),
        role,
        area,
        start_time,
        end_time,
        duration_minutes,
        week_start: week_start(start_time.date(), config.week_start),
    })
}

/// Tries each format in order and returns the first successful parse.
pub fn parse_timestamp<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format.as_ref()).ok())
}

/// Reads an explicit minutes value, flooring the absolute value.
///
/// Non-numeric, NaN and infinite values count as absent.
pub fn parse_duration(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let minutes = value.abs().floor();
    if minutes > f64::from(u32::MAX) {
        return None;
    }
    Some(minutes as u32)
}

/// Picks `;` when the first line has more semicolons than commas.
pub fn sniff_delimiter(content: &[u8]) -> u8 {
    let first_line = content.split(|&byte| byte == b'\n').next().unwrap_or(&[]);
    let commas = first_line.iter().filter(|&&byte| byte == b',').count();
    let semicolons = first_line.iter().filter(|&&byte| byte == b';').count();
    if semicolons > commas { b';' } else { b',' }
}
