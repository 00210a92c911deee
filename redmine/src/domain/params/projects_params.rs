use serde::Serialize;

use super::PagedParams;
use crate::Page;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PagedParams for ProjectsParams {
    fn with_page(self, page: Page) -> Self {
        Self {
            offset: Some(page.offset),
            limit: Some(page.limit),
        }
    }
}
