use std::sync::Arc;

use futures::future::join_all;
use redmine::{
    ApiKeyCipher, RedmineResponse, StatusResponse, TimeEntriesParams, TimeEntry,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{
        hours_by_connection, hours_by_day, hours_by_project, hours_by_week, Connection,
        ConnectionHours, DailyHours, DateRange, HoursError, ProjectHours, TimeEntryBatch,
        WeeklyHours,
    },
    repositories::ConnectionRepository,
};

/// Outcome of fetching one connection's entries. A failed fetch still contributes whatever
/// entries were collected before the failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connection_id: Uuid,
    pub name: String,
    pub entries: usize,
    pub status: StatusResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub range: DateRange,
    pub connections: Vec<ConnectionStatus>,
    pub by_day: Vec<DailyHours>,
    pub by_week: Vec<WeeklyHours>,
    pub by_project: Vec<ProjectHours>,
    pub by_connection: Vec<ConnectionHours>,
}

pub struct DashboardService<R> {
    repo: Arc<R>,
    cipher: ApiKeyCipher,
    page_size: u32,
}

impl<R: ConnectionRepository> DashboardService<R> {
    pub fn new(repo: Arc<R>, cipher: ApiKeyCipher, page_size: u32) -> Self {
        Self {
            repo,
            cipher,
            page_size,
        }
    }

    /// Fetches the user's time entries in `range` from every connection concurrently, waits
    /// for all of them, and aggregates whatever came back.
    #[instrument(level = "debug", skip(self))]
    pub async fn dashboard(&self, range: DateRange) -> Result<Dashboard, HoursError> {
        let connections = self.repo.list_connections().await?;

        let results = join_all(
            connections
                .iter()
                .map(|connection| self.fetch_entries(connection, range)),
        )
        .await;

        let mut batches = Vec::with_capacity(connections.len());
        let mut statuses = Vec::with_capacity(connections.len());

        for (connection, response) in connections.iter().zip(results) {
            if response.has_error() {
                tracing::warn!(
                    connection = %connection.id,
                    status = response.status.status_code,
                    "Dashboard data from connection is incomplete"
                );
            }

            statuses.push(ConnectionStatus {
                connection_id: connection.id,
                name: connection.name.clone(),
                entries: response.data.len(),
                status: response.status,
            });
            batches.push(TimeEntryBatch {
                connection_id: connection.id,
                data: response.data,
            });
        }

        Ok(Dashboard {
            range,
            connections: statuses,
            by_day: hours_by_day(&batches),
            by_week: hours_by_week(&batches),
            by_project: hours_by_project(&batches, &connections),
            by_connection: hours_by_connection(&batches, &connections),
        })
    }

    async fn fetch_entries(
        &self,
        connection: &Connection,
        range: DateRange,
    ) -> RedmineResponse<Vec<TimeEntry>> {
        let client = match connection.client(&self.cipher) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(connection = %connection.id, "Invalid stored connection: {}", e);
                return RedmineResponse::failure(StatusResponse::internal_error(e.to_string()));
            }
        };

        let params = TimeEntriesParams::between(range.from, range.to)
            .for_user(connection.redmine_user_id);

        client.all_time_entries(&params, self.page_size).await
    }
}
