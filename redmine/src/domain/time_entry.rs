use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{CustomField, NamedRef};

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: u64,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub project: NamedRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueRef>,
    pub user: NamedRef,
    pub activity: NamedRef,
    pub hours: f64,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(deserialize_with = "deserialize_spent_on")]
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

/// Accepts `YYYY-MM-DD` as well as a full RFC 3339 timestamp, keeping the date only.
fn deserialize_spent_on<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_spent_on(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_spent_on(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| format!("invalid spent_on date {raw:?}: {e}"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeEntriesPage {
    pub time_entries: Vec<TimeEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeEntryRoot {
    pub time_entry: TimeEntry,
}
