use std::sync::Arc;

use redmine::{
    build_project_tree, serialize_project_tree, ApiKeyCipher, Project, RedmineApiOptions,
    RedmineClient, RedmineResponse, StatusResponse, User,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    domain::{Connection, HoursError},
    repositories::{ConnectionRepository, RepositoryError},
};

/// Credentials as entered by the user when adding a connection.
#[derive(Debug, Clone, Default)]
pub struct ConnectRequest {
    pub name: String,
    pub url: String,
    /// `"apikey"` (default) or `"password"`.
    pub auth_type: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub struct ConnectionService<R> {
    repo: Arc<R>,
    cipher: ApiKeyCipher,
    page_size: u32,
}

impl<R: ConnectionRepository> ConnectionService<R> {
    pub fn new(repo: Arc<R>, cipher: ApiKeyCipher, page_size: u32) -> Self {
        Self {
            repo,
            cipher,
            page_size,
        }
    }

    fn request_client(&self, request: &ConnectRequest) -> Result<RedmineClient, HoursError> {
        let options = RedmineApiOptions::from_parts(
            &request.url,
            request.auth_type.as_deref(),
            request.api_key.as_deref(),
            request.username.as_deref(),
            request.password.as_deref(),
            false,
        )?;
        Ok(RedmineClient::new(options, self.cipher.clone())?)
    }

    /// Checks credentials against Redmine without saving anything. Only malformed options are an
    /// `Err`; a rejected login comes back in the envelope status.
    #[instrument(level = "debug", skip(self, request), fields(url = %request.url))]
    pub async fn test(
        &self,
        request: &ConnectRequest,
    ) -> Result<RedmineResponse<Option<User>>, HoursError> {
        let client = self.request_client(request)?;
        Ok(client.current_user().await)
    }

    /// Authenticates against Redmine and saves the connection. A live connection to the same URL
    /// is updated in place; its name only changes when a new one is given.
    #[instrument(level = "debug", skip(self, request), fields(url = %request.url))]
    pub async fn connect(&self, request: ConnectRequest) -> Result<Connection, HoursError> {
        let client = self.request_client(&request)?;

        let user = authenticated_user(&client).await?;
        let api_key = user
            .api_key
            .clone()
            .ok_or_else(|| HoursError::MissingApiKey(user.login.clone()))?;

        let connection = match self.repo.find_by_url(&request.url).await? {
            Some(mut existing) => {
                existing.apply_user(&request.name, &user, api_key);
                existing
            }
            None => Connection::from_user(&request.name, &request.url, &user, api_key),
        };

        self.repo.upsert_connection(&connection).await?;
        tracing::info!(connection = %connection.id, login = %user.login, "Saved Redmine connection");

        Ok(connection)
    }

    /// Re-authenticates a stored connection with its encrypted key and refreshes its identity.
    #[instrument(level = "debug", skip(self))]
    pub async fn retest(&self, id: Uuid) -> Result<Connection, HoursError> {
        let mut connection = self.get(id).await?;
        let client = connection.client(&self.cipher)?;

        let user = authenticated_user(&client).await?;
        let api_key = user
            .api_key
            .clone()
            .unwrap_or_else(|| connection.api_key.clone());
        connection.apply_user("", &user, api_key);

        self.repo.upsert_connection(&connection).await?;
        Ok(connection)
    }

    /// Fetches every project, stores the active two-level tree on the connection and returns it.
    #[instrument(level = "debug", skip(self))]
    pub async fn sync_projects(&self, id: Uuid) -> Result<Vec<Project>, HoursError> {
        let mut connection = self.get(id).await?;
        let client = connection.client(&self.cipher)?;

        let projects = client.all_projects(self.page_size).await.into_result()?;
        let tree = build_project_tree(projects);

        connection.projects = serialize_project_tree(&tree).map_err(RepositoryError::from)?;
        self.repo.upsert_connection(&connection).await?;
        tracing::info!(connection = %id, roots = tree.len(), "Synced project tree");

        Ok(tree)
    }

    pub async fn list(&self) -> Result<Vec<Connection>, HoursError> {
        Ok(self.repo.list_connections().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Connection, HoursError> {
        self.repo.get_connection(id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => HoursError::ConnectionNotFound(id),
            other => other.into(),
        })
    }

    pub async fn remove(&self, id: Uuid, hard: bool) -> Result<(), HoursError> {
        self.repo.delete_connection(id, hard).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => HoursError::ConnectionNotFound(id),
            other => other.into(),
        })
    }
}

async fn authenticated_user(client: &RedmineClient) -> Result<User, HoursError> {
    client.current_user().await.into_result()?.ok_or_else(|| {
        HoursError::Redmine(StatusResponse::internal_error(
            "Redmine returned no current user",
        ))
    })
}
