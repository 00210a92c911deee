use serde::{Deserialize, Serialize};

/// A time entry activity enumeration value, e.g. "Development".
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntryActivity {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivitiesRoot {
    pub time_entry_activities: Vec<TimeEntryActivity>,
}
