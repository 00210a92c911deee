use chrono::NaiveDate;
use serde::Serialize;

/// What a time entry is booked against. Serializes to exactly one of `issue_id` / `project_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingTarget {
    #[serde(rename = "issue_id")]
    Issue(u64),
    #[serde(rename = "project_id")]
    Project(u64),
}

impl BookingTarget {
    /// An issue wins over a sub-project, which wins over the project. Zero counts as unset.
    pub fn resolve(
        issue_id: Option<u64>,
        sub_project_id: Option<u64>,
        project_id: Option<u64>,
    ) -> Option<Self> {
        let positive = |id: Option<u64>| id.filter(|id| *id > 0);

        positive(issue_id)
            .map(Self::Issue)
            .or_else(|| positive(sub_project_id).map(Self::Project))
            .or_else(|| positive(project_id).map(Self::Project))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTimeEntry {
    #[serde(flatten)]
    pub target: BookingTarget,
    pub spent_on: NaiveDate,
    pub hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl NewTimeEntry {
    pub fn new(target: BookingTarget, spent_on: NaiveDate, hours: f64) -> Self {
        Self {
            target,
            spent_on,
            hours,
            activity_id: None,
            comments: None,
            user_id: None,
        }
    }
}

/// Partial update of a time entry; only the set fields are sent.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntryUpdate {
    #[serde(flatten)]
    pub target: Option<BookingTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}
