use chrono::NaiveDate;
use serde::Serialize;

use super::PagedParams;
use crate::Page;

/// Filters for `GET /time_entries.json`. Unset fields are left out of the query string.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntriesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl TimeEntriesParams {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn for_user(self, user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..self
        }
    }

    pub fn for_project(self, project_id: u64) -> Self {
        Self {
            project_id: Some(project_id),
            ..self
        }
    }
}

impl PagedParams for TimeEntriesParams {
    fn with_page(self, page: Page) -> Self {
        Self {
            offset: Some(page.offset),
            limit: Some(page.limit),
            ..self
        }
    }
}
