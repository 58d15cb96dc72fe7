//! Error taxonomy for ingestion.
//!
//! [`IngestError`] aborts a run; [`SkipReason`] is attached to a single data
//! row that was dropped while the rest of the file keeps flowing.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::columns::Field;

/// A structurally unusable file. No partial result is produced.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input contained no header row")]
    EmptyInput,

    #[error("missing required column(s): {}", describe_fields(.fields))]
    MissingColumns { fields: Vec<Field> },

    #[error("CSV header could not be read: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },
}

fn describe_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| format!("{} (expected one of: {})", field, field.synonyms().join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid week start day '{0}'")]
    WeekStart(String),

    #[error("delimiter must be a single ASCII character, got '{0}'")]
    Delimiter(String),
}

/// Why a data row was excluded from the entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingContractor,
    MissingWorker,
    UnparseableStart,
    MalformedRecord,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingContractor => "contractor is blank",
            SkipReason::MissingWorker => "worker name is blank",
            SkipReason::UnparseableStart => "start time is missing or unparseable",
            SkipReason::MalformedRecord => "record could not be decoded",
        };
        f.write_str(text)
    }
}
