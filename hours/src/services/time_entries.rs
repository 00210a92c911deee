use std::sync::Arc;

use chrono::NaiveDate;
use redmine::{
    ApiKeyCipher, BookingTarget, NewTimeEntry, RedmineClient, RedmineResponse, StatusResponse,
    TimeEntriesParams, TimeEntry, TimeEntryActivity, TimeEntryUpdate,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{Connection, DateRange, HoursError},
    repositories::{ConnectionRepository, RepositoryError},
};

/// A time entry as entered by the user. The booking target follows issue, then sub-project,
/// then project.
#[derive(Debug, Clone, Default)]
pub struct LogTimeEntry {
    pub issue_id: Option<u64>,
    pub sub_project_id: Option<u64>,
    pub project_id: Option<u64>,
    pub spent_on: Option<NaiveDate>,
    pub hours: f64,
    pub activity_id: Option<u64>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EditTimeEntry {
    pub issue_id: Option<u64>,
    pub sub_project_id: Option<u64>,
    pub project_id: Option<u64>,
    pub spent_on: Option<NaiveDate>,
    pub hours: Option<f64>,
    pub activity_id: Option<u64>,
    pub comments: Option<String>,
}

impl From<EditTimeEntry> for TimeEntryUpdate {
    fn from(edit: EditTimeEntry) -> Self {
        Self {
            target: BookingTarget::resolve(edit.issue_id, edit.sub_project_id, edit.project_id),
            spent_on: edit.spent_on,
            hours: edit.hours,
            activity_id: edit.activity_id,
            comments: edit.comments,
        }
    }
}

pub struct TimeEntryService<R> {
    repo: Arc<R>,
    cipher: ApiKeyCipher,
    page_size: u32,
}

impl<R: ConnectionRepository> TimeEntryService<R> {
    pub fn new(repo: Arc<R>, cipher: ApiKeyCipher, page_size: u32) -> Self {
        Self {
            repo,
            cipher,
            page_size,
        }
    }

    async fn connection(&self, id: Uuid) -> Result<(Connection, RedmineClient), HoursError> {
        let connection = self.repo.get_connection(id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => HoursError::ConnectionNotFound(id),
            other => other.into(),
        })?;
        let client = connection.client(&self.cipher)?;
        Ok((connection, client))
    }

    pub async fn activities(&self, connection_id: Uuid) -> Result<Vec<TimeEntryActivity>, HoursError> {
        let (_, client) = self.connection(connection_id).await?;
        Ok(client.activities().await.into_result()?)
    }

    /// The connection user's time entries in `range`, every page. A failed page leaves the
    /// entries fetched so far in `data` with the failing status.
    #[instrument(level = "debug", skip(self))]
    pub async fn list(
        &self,
        connection_id: Uuid,
        range: DateRange,
    ) -> Result<RedmineResponse<Vec<TimeEntry>>, HoursError> {
        let (connection, client) = self.connection(connection_id).await?;
        let params = TimeEntriesParams::between(range.from, range.to)
            .for_user(connection.redmine_user_id);

        Ok(client.all_time_entries(&params, self.page_size).await)
    }

    /// Books time for the connection's Redmine user. `spent_on` defaults to `today`.
    #[instrument(level = "debug", skip(self, entry))]
    pub async fn log(
        &self,
        connection_id: Uuid,
        entry: LogTimeEntry,
        today: NaiveDate,
    ) -> Result<TimeEntry, HoursError> {
        let target = BookingTarget::resolve(entry.issue_id, entry.sub_project_id, entry.project_id)
            .ok_or(HoursError::MissingBookingTarget)?;
        let (connection, client) = self.connection(connection_id).await?;

        let mut new_entry = NewTimeEntry::new(target, entry.spent_on.unwrap_or(today), entry.hours);
        new_entry.activity_id = entry.activity_id.filter(|id| *id > 0);
        new_entry.comments = entry.comments;
        new_entry.user_id = Some(connection.redmine_user_id).filter(|id| *id > 0);

        client.create_time_entry(&new_entry).await.into_result()?.ok_or_else(|| {
            HoursError::Redmine(StatusResponse::internal_error(
                "Redmine did not return the created time entry",
            ))
        })
    }

    #[instrument(level = "debug", skip(self, edit))]
    pub async fn edit(
        &self,
        connection_id: Uuid,
        entry_id: u64,
        edit: EditTimeEntry,
    ) -> Result<StatusResponse, HoursError> {
        let (_, client) = self.connection(connection_id).await?;
        let status = client.update_time_entry(entry_id, &edit.into()).await.status;
        succeeded(status)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, connection_id: Uuid, entry_id: u64) -> Result<StatusResponse, HoursError> {
        let (_, client) = self.connection(connection_id).await?;
        let status = client.delete_time_entry(entry_id).await.status;
        succeeded(status)
    }
}

fn succeeded(status: StatusResponse) -> Result<StatusResponse, HoursError> {
    if status.has_error {
        return Err(status.into());
    }
    Ok(status)
}
