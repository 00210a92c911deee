use reqwest::{
    header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    domain::{ActivitiesRoot, ProjectsPage, TimeEntriesPage, TimeEntryRoot, UserRoot},
    fetch_all, ApiKeyCipher, AuthMethod, ConfigError, CryptoError, NewTimeEntry, PagedParams,
    Project, ProjectsParams, RedmineApiOptions, RedmineResponse, RedmineURL, TimeEntriesParams,
    TimeEntry, TimeEntryActivity, TimeEntryUpdate, User,
};

pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";
const UPLOADS_PATH: &str = "/uploads.json";

/// Client for one Redmine host.
///
/// Every public operation returns a [`RedmineResponse`]; failures of any kind, including a stored
/// API key that no longer decrypts, are reported through its status and never as `Err`.
#[derive(Debug, Clone)]
pub struct RedmineClient {
    client: reqwest::Client,
    base_url: RedmineURL,
    auth: AuthMethod,
    cipher: ApiKeyCipher,
}

impl RedmineClient {
    pub fn new(options: RedmineApiOptions, cipher: ApiKeyCipher) -> Result<Self, ConfigError> {
        options.validate()?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: RedmineURL::new(&options.host),
            auth: options.auth,
            cipher,
        })
    }

    pub fn host(&self) -> &str {
        self.base_url.as_ref()
    }

    pub fn auth_type(&self) -> &'static str {
        self.auth.auth_type()
    }

    /// Sends one authenticated request. GET params go into the query string, mutating methods
    /// send them as the JSON body. Non-2xx responses are turned into [`RedmineFetchError::Upstream`].
    async fn request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Option<&P>,
    ) -> Result<Response, RedmineFetchError> {
        let url = self.base_url.append_path(path);

        let mut builder = self
            .client
            .request(method.clone(), url.as_ref())
            .header(CONTENT_TYPE, content_type_for(path))
            .header(ACCEPT, "application/json");

        if let Some(params) = params {
            if method == Method::GET {
                builder = builder.query(params);
            } else if [Method::POST, Method::PUT, Method::PATCH].contains(&method) {
                builder = builder.json(params);
            }
        }

        builder = match &self.auth {
            AuthMethod::ApiKey(key) => builder.header(API_KEY_HEADER, api_key_header(key)?),
            AuthMethod::EncryptedApiKey {
                ciphertext,
                username,
            } => {
                let key = self.cipher.decrypt(ciphertext, username)?;
                builder.header(API_KEY_HEADER, api_key_header(&key)?)
            }
            AuthMethod::Password { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        };

        tracing::debug!(%method, url = url.as_ref(), "Sending Redmine request");

        let resp = builder
            .send()
            .await
            .map_err(|e| RedmineFetchError::ResponseError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedmineFetchError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Option<&P>,
    ) -> Result<(T, StatusCode), RedmineFetchError> {
        let resp = self.request(method, path, params).await?;
        let status = resp.status();

        let resp_data = resp.json::<T>().await.map_err(|e| {
            RedmineFetchError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })?;

        Ok((resp_data, status))
    }

    /// Like [`Self::fetch`] for endpoints that answer with an empty body.
    async fn execute<P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: Option<&P>,
    ) -> Result<((), StatusCode), RedmineFetchError> {
        let resp = self.request(method, path, params).await?;
        Ok(((), resp.status()))
    }

    /// The authenticated user. The returned `api_key` is already encrypted for the user's login.
    #[instrument(level = "debug", skip_all)]
    pub async fn current_user(&self) -> RedmineResponse<Option<User>> {
        let result = self
            .fetch::<UserRoot, ()>(Method::GET, "/users/current.json", None)
            .await
            .and_then(|(root, status)| {
                let mut user = root.user;
                user.api_key = match user.api_key.take().filter(|k| !k.is_empty()) {
                    Some(key) => Some(self.cipher.encrypt(&key, &user.login)?),
                    None => None,
                };
                Ok((Some(user), status))
            });

        envelope("current_user", result)
    }

    /// One page of projects.
    #[instrument(level = "debug", skip_all)]
    pub async fn projects(&self, params: &ProjectsParams) -> RedmineResponse<Vec<Project>> {
        let result = self
            .fetch::<ProjectsPage, _>(Method::GET, "/projects.json", Some(params))
            .await
            .map(|(page, status)| (page.projects, status));

        envelope("projects", result)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn activities(&self) -> RedmineResponse<Vec<TimeEntryActivity>> {
        let result = self
            .fetch::<ActivitiesRoot, ()>(
                Method::GET,
                "/enumerations/time_entry_activities.json",
                None,
            )
            .await
            .map(|(root, status)| (root.time_entry_activities, status));

        envelope("activities", result)
    }

    /// One page of time entries matching `params`.
    #[instrument(level = "debug", skip_all)]
    pub async fn time_entries(&self, params: &TimeEntriesParams) -> RedmineResponse<Vec<TimeEntry>> {
        let result = self
            .fetch::<TimeEntriesPage, _>(Method::GET, "/time_entries.json", Some(params))
            .await
            .map(|(page, status)| (page.time_entries, status));

        envelope("time_entries", result)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn create_time_entry(&self, entry: &NewTimeEntry) -> RedmineResponse<Option<TimeEntry>> {
        let body = TimeEntryBody { time_entry: entry };
        let result = self
            .fetch::<TimeEntryRoot, _>(Method::POST, "/time_entries.json", Some(&body))
            .await
            .map(|(root, status)| (Some(root.time_entry), status));

        envelope("create_time_entry", result)
    }

    #[instrument(level = "debug", skip(self, update))]
    pub async fn update_time_entry(&self, id: u64, update: &TimeEntryUpdate) -> RedmineResponse<()> {
        let body = TimeEntryBody { time_entry: update };
        let result = self
            .execute(Method::PUT, &format!("/time_entries/{id}.json"), Some(&body))
            .await;

        envelope("update_time_entry", result)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete_time_entry(&self, id: u64) -> RedmineResponse<()> {
        let result = self
            .execute::<()>(Method::DELETE, &format!("/time_entries/{id}.json"), None)
            .await;

        envelope("delete_time_entry", result)
    }

    /// Every project the user can see, fetched page by page.
    pub async fn all_projects(&self, page_size: u32) -> RedmineResponse<Vec<Project>> {
        fetch_all(page_size, |page| async move {
            self.projects(&ProjectsParams::default().with_page(page))
                .await
        })
        .await
    }

    /// Every time entry matching `params`, fetched page by page. `offset`/`limit` are overridden.
    pub async fn all_time_entries(
        &self,
        params: &TimeEntriesParams,
        page_size: u32,
    ) -> RedmineResponse<Vec<TimeEntry>> {
        fetch_all(page_size, |page| {
            let paged = params.clone().with_page(page);
            async move { self.time_entries(&paged).await }
        })
        .await
    }
}

#[derive(Serialize)]
struct TimeEntryBody<'a, T: Serialize> {
    time_entry: &'a T,
}

fn content_type_for(path: &str) -> &'static str {
    if path == UPLOADS_PATH {
        "application/octet-stream"
    } else {
        "application/json"
    }
}

fn api_key_header(key: &str) -> Result<HeaderValue, RedmineFetchError> {
    if key.trim().is_empty() {
        return Err(RedmineFetchError::AuthConfig(
            "Neither api key nor username/password provided".to_string(),
        ));
    }

    let mut value = HeaderValue::from_str(key.trim()).map_err(|_| {
        RedmineFetchError::AuthConfig("API key is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

fn envelope<T: Default>(
    operation: &'static str,
    result: Result<(T, StatusCode), RedmineFetchError>,
) -> RedmineResponse<T> {
    if let Err(e) = &result {
        tracing::error!(operation, "Redmine request failed: {}", e);
    }
    result.into()
}

#[derive(Error, Debug)]
pub enum RedmineFetchError {
    #[error("AuthConfigError: {0}")]
    AuthConfig(String),
    #[error("CryptoError: {0}")]
    Crypto(#[from] CryptoError),
    #[error("UpstreamError: {status} {status_text}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
}
