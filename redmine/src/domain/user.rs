use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CustomField;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_on: Option<DateTime<Utc>>,
    /// Encrypted with [`crate::ApiKeyCipher`] once returned from [`crate::RedmineClient::current_user`].
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRoot {
    pub user: User,
}
