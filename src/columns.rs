//! Header resolution for time-tracking exports.
//!
//! Two header conventions are in circulation (`Worker Name`/`In`/`Out`/`Total Minutes`
//! and `Person`/`StartTime`/`EndTime`/`Duration`). Each semantic [`Field`] owns an
//! ordered list of accepted header names; the header row is resolved once into a
//! [`ColumnMap`] before any data row is read.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Contractor,
    Worker,
    Role,
    Area,
    Start,
    End,
    Duration,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Contractor,
        Field::Worker,
        Field::Role,
        Field::Area,
        Field::Start,
        Field::End,
        Field::Duration,
    ];

    /// Built-in header names, highest priority first.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Field::Contractor => &["Contractor"],
            Field::Worker => &["Worker Name", "Person", "Name"],
            Field::Role => &["Role", "Job Title", "JobTitle", "Position"],
            Field::Area => &["Area"],
            Field::Start => &["In", "StartTime", "Start Time"],
            Field::End => &["Out", "EndTime", "End Time"],
            Field::Duration => &["Total Minutes", "Duration"],
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Field::Contractor | Field::Worker | Field::Start)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Contractor => "contractor",
            Field::Worker => "worker name",
            Field::Role => "role",
            Field::Area => "area",
            Field::Start => "start time",
            Field::End => "end time",
            Field::Duration => "duration",
        };
        f.write_str(name)
    }
}

/// Column order of the time system's export when it is written without a header row.
pub const EXPORT_LAYOUT: [&str; 12] = [
    "Contractor",
    "Person",
    "PersonID",
    "StartTime",
    "EndTime",
    "Location",
    "Area",
    "Duration",
    "Status",
    "ID",
    "Role",
    "JobTitle",
];

/// Synthesizes header names for a headerless record of `width` columns.
pub fn positional_headers(width: usize) -> Vec<String> {
    EXPORT_LAYOUT
        .iter()
        .take(width)
        .map(|name| name.to_string())
        .collect()
}

/// Resolved column index for every semantic field present in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<Field, usize>,
}

impl ColumnMap {
    /// Resolves `headers` against the built-in synonyms followed by `extra` ones.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingColumns`] listing every required field
    /// that has no matching header.
    pub fn resolve<S: AsRef<str>>(
        headers: &[S],
        extra: &BTreeMap<Field, Vec<String>>,
    ) -> Result<Self, IngestError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect();

        let mut indices = BTreeMap::new();
        let mut missing = Vec::new();

        for field in Field::ALL {
            let mut candidates: Vec<&str> = field.synonyms().to_vec();
            if let Some(configured) = extra.get(&field) {
                candidates.extend(configured.iter().map(String::as_str));
            }

            let found = candidates.into_iter().find_map(|candidate| {
                let candidate = normalize_header(candidate);
                normalized.iter().position(|h| *h == candidate)
            });

            match found {
                Some(index) => {
                    indices.insert(field, index);
                }
                None if field.is_required() => missing.push(field),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(IngestError::MissingColumns { fields: missing });
        }

        Ok(Self { indices })
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Returns the trimmed cell for `field`, or `None` when the column is
    /// absent, the record is short, or the cell is blank.
    pub fn get<'r>(&self, record: &'r csv::StringRecord, field: Field) -> Option<&'r str> {
        self.index(field)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_extra() -> BTreeMap<Field, Vec<String>> {
        BTreeMap::new()
    }

    #[test]
    fn test_resolves_worker_name_convention() {
        let headers = ["Contractor", "Worker Name", "In", "Out", "Total Minutes", "Area"];
        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();

        assert_eq!(map.index(Field::Contractor), Some(0));
        assert_eq!(map.index(Field::Worker), Some(1));
        assert_eq!(map.index(Field::Start), Some(2));
        assert_eq!(map.index(Field::End), Some(3));
        assert_eq!(map.index(Field::Duration), Some(4));
        assert_eq!(map.index(Field::Area), Some(5));
        assert_eq!(map.index(Field::Role), None);
    }

    #[test]
    fn test_resolves_person_convention_case_insensitively() {
        let headers = ["\u{feff}contractor", " PERSON ", "starttime", "EndTime", "Duration", "Job Title"];
        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();

        assert_eq!(map.index(Field::Contractor), Some(0));
        assert_eq!(map.index(Field::Worker), Some(1));
        assert_eq!(map.index(Field::Start), Some(2));
        assert_eq!(map.index(Field::Role), Some(5));
    }

    #[test]
    fn test_earlier_synonym_wins() {
        let headers = ["Contractor", "Name", "Person", "StartTime"];
        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();

        assert_eq!(map.index(Field::Worker), Some(2));
    }

    #[test]
    fn test_duplicate_header_uses_first_column() {
        let headers = ["Contractor", "Person", "StartTime", "Person"];
        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();

        assert_eq!(map.index(Field::Worker), Some(1));
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let headers = ["Person", "Area"];
        let err = ColumnMap::resolve(&headers, &no_extra()).unwrap_err();

        match err {
            IngestError::MissingColumns { fields } => {
                assert_eq!(fields, vec![Field::Contractor, Field::Start]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_configured_synonym_is_accepted() {
        let mut extra = BTreeMap::new();
        extra.insert(Field::Worker, vec!["Operative".to_string()]);
        let headers = ["Contractor", "Operative", "StartTime"];

        let map = ColumnMap::resolve(&headers, &extra).unwrap();
        assert_eq!(map.index(Field::Worker), Some(1));
    }

    #[test]
    fn test_get_trims_and_drops_blank_cells() {
        let headers = ["Contractor", "Person", "StartTime", "Role"];
        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();
        let record = csv::StringRecord::from(vec!["  Allelys ", "John", "13/06/2024 11:27", "   "]);

        assert_eq!(map.get(&record, Field::Contractor), Some("Allelys"));
        assert_eq!(map.get(&record, Field::Role), None);
        assert_eq!(map.get(&record, Field::Area), None);
    }

    #[test]
    fn test_positional_headers_truncate_to_width() {
        let headers = positional_headers(5);
        assert_eq!(headers, vec!["Contractor", "Person", "PersonID", "StartTime", "EndTime"]);

        let map = ColumnMap::resolve(&headers, &no_extra()).unwrap();
        assert_eq!(map.index(Field::End), Some(4));
        assert_eq!(map.index(Field::Duration), None);
    }
}
