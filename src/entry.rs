use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Serialize, Serializer};

/// Location category of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Area {
    Site,
    Welfare,
    /// Any other label, trimmed but otherwise kept as exported.
    Other(String),
}

impl Area {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("site") {
            Area::Site
        } else if trimmed.eq_ignore_ascii_case("welfare") {
            Area::Welfare
        } else {
            Area::Other(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Area::Site => "Site",
            Area::Welfare => "Welfare",
            Area::Other(label) => label,
        }
    }
}

impl Serialize for Area {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One normalized record of a worker's time in an area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntry {
    pub contractor: String,
    pub worker_name: String,
    pub role: String,
    pub area: Area,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<u32>,
    pub week_start: NaiveDate,
}

/// Returns the most recent `anchor` weekday on or before `date`.
pub fn week_start(date: NaiveDate, anchor: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7 - anchor.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// Whole minutes between `start` and `end`, rounded down; `None` when `end`
/// precedes `start`, even by seconds.
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> Option<u32> {
    if end < start {
        return None;
    }
    u32::try_from((end - start).num_minutes()).ok()
}
