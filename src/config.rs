use std::collections::BTreeMap;

use chrono::Weekday;
use serde::Deserialize;

use crate::columns::Field;
use crate::errors::ConfigError;

/// Timestamp formats tried in order for every start and end value.
pub const DEFAULT_TIMESTAMP_FORMATS: [&str; 4] = [
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M",
];

pub const DEFAULT_UNKNOWN_ROLE: &str = "Unknown";

/// Ingestion settings.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "week_start": "Mon",
///   "timestamp_formats": ["%d/%m/%Y %H:%M"],
///   "unknown_role": "Unknown",
///   "delimiter": ";",
///   "has_headers": true,
///   "columns": { "worker": ["Operative"] }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub week_start: Weekday,
    pub timestamp_formats: Vec<String>,
    pub unknown_role: String,
    /// `None` sniffs the delimiter from the header line.
    pub delimiter: Option<u8>,
    pub has_headers: bool,
    /// Extra header names per field, tried after the built-in ones.
    pub columns: BTreeMap<Field, Vec<String>>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Mon,
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            unknown_role: DEFAULT_UNKNOWN_ROLE.to_string(),
            delimiter: None,
            has_headers: true,
            columns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    week_start: Option<String>,
    timestamp_formats: Option<Vec<String>>,
    unknown_role: Option<String>,
    delimiter: Option<String>,
    has_headers: Option<bool>,
    columns: BTreeMap<Field, Vec<String>>,
}

impl AnalyzerConfig {
    /// Loads the config from a JSON file at `path`, filling unset keys with defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|err| match err {
            ConfigError::Json { source, .. } => ConfigError::Json {
                path: path.to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: "<inline>".to_string(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(day) = file.week_start {
            config.week_start = parse_weekday(&day)?;
        }
        if let Some(formats) = file.timestamp_formats {
            if !formats.is_empty() {
                config.timestamp_formats = formats;
            }
        }
        if let Some(role) = file.unknown_role {
            config.unknown_role = role;
        }
        if let Some(delimiter) = file.delimiter {
            config.delimiter = Some(parse_delimiter(&delimiter)?);
        }
        if let Some(has_headers) = file.has_headers {
            config.has_headers = has_headers;
        }
        config.columns = file.columns;

        Ok(config)
    }
}

/// Accepts English weekday names or abbreviations in any case (`mon`, `Monday`).
pub fn parse_weekday(raw: &str) -> Result<Weekday, ConfigError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| ConfigError::WeekStart(raw.to_string()))
}

/// Accepts a single ASCII character, or `\t`/`tab` for tab-separated exports.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ConfigError::Delimiter(raw.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();

        assert_eq!(config.week_start, Weekday::Mon);
        assert_eq!(config.timestamp_formats[0], "%d/%m/%Y %H:%M");
        assert_eq!(config.unknown_role, "Unknown");
        assert!(config.has_headers);
        assert!(config.delimiter.is_none());
    }

    #[test]
    fn test_from_json_overrides_selected_keys() {
        let config = AnalyzerConfig::from_json(
            r#"{ "week_start": "sunday", "delimiter": ";", "columns": { "worker": ["Operative"] } }"#,
        )
        .unwrap();

        assert_eq!(config.week_start, Weekday::Sun);
        assert_eq!(config.delimiter, Some(b';'));
        assert_eq!(config.columns[&Field::Worker], vec!["Operative".to_string()]);
        assert_eq!(config.unknown_role, "Unknown");
    }

    #[test]
    fn test_from_json_rejects_bad_weekday() {
        let err = AnalyzerConfig::from_json(r#"{ "week_start": "someday" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::WeekStart(_)));
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = AnalyzerConfig::from_json(r#"{ "weekstart": "mon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn test_load_reports_path_on_missing_file() {
        let path = format!("{}/workforce_analyzer_missing_config.json", env::temp_dir().display());
        let _ = fs::remove_file(&path);

        let err = AnalyzerConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("workforce_analyzer_missing_config.json"));
    }

    #[test]
    fn test_load_reads_file() {
        let path = format!("{}/workforce_analyzer_test_config.json", env::temp_dir().display());
        fs::write(&path, r#"{ "unknown_role": "Unassigned", "has_headers": false }"#).unwrap();

        let config = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(config.unknown_role, "Unassigned");
        assert!(!config.has_headers);

        fs::remove_file(&path).unwrap();
    }
}
