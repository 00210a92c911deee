use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomField, NamedRef};

pub const PROJECT_STATUS_ACTIVE: i32 = 1;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NamedRef>,
    /// Only populated on top-level projects of a tree built by [`crate::build_project_tree`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Project>,
    pub status: i32,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == PROJECT_STATUS_ACTIVE
    }

    pub fn parent_id(&self) -> Option<u64> {
        self.parent.as_ref().map(|p| p.id).filter(|id| *id > 0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsPage {
    pub projects: Vec<Project>,
}
