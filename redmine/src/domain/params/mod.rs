mod projects_params;
mod time_entries_params;
mod time_entry_payload;

pub use projects_params::ProjectsParams;
pub use time_entries_params::TimeEntriesParams;
pub use time_entry_payload::{BookingTarget, NewTimeEntry, TimeEntryUpdate};

use crate::Page;

/// Query parameters of a paged Redmine listing endpoint.
pub trait PagedParams: Clone {
    fn with_page(self, page: Page) -> Self;
}
