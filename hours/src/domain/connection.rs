use redmine::{
    parse_project_tree, ApiKeyCipher, ConfigError, Project, RedmineApiOptions, RedmineClient, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved Redmine account. `api_key` is always stored encrypted for `username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub username: String,
    pub api_key: String,
    pub redmine_user_id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    /// Serialized two-level project tree, empty until the first sync.
    #[serde(default)]
    pub projects: String,
    #[serde(default)]
    pub deleted: bool,
}

impl Connection {
    /// A new connection for the user Redmine authenticated. `encrypted_api_key` must be
    /// encrypted for `user.login`.
    pub fn from_user(name: &str, url: &str, user: &User, encrypted_api_key: String) -> Self {
        let name = match name.trim() {
            "" => user.display_name(),
            name => name.to_string(),
        };
        let mut connection = Self {
            id: Uuid::new_v4(),
            name,
            url: url.trim_end_matches('/').to_string(),
            username: String::new(),
            api_key: String::new(),
            redmine_user_id: 0,
            firstname: String::new(),
            lastname: String::new(),
            email: String::new(),
            projects: String::new(),
            deleted: false,
        };
        connection.apply_user("", user, encrypted_api_key);
        connection
    }

    /// Refreshes identity and credentials after a successful re-authentication. The name only
    /// changes when a non-blank one is given.
    pub fn apply_user(&mut self, name: &str, user: &User, encrypted_api_key: String) {
        if !name.trim().is_empty() {
            self.name = name.trim().to_string();
        }
        self.username = user.login.clone();
        self.api_key = encrypted_api_key;
        self.redmine_user_id = user.id;
        self.firstname = user.firstname.clone();
        self.lastname = user.lastname.clone();
        self.email = user.mail.clone().unwrap_or_default();
    }

    pub fn api_options(&self) -> RedmineApiOptions {
        RedmineApiOptions::with_encrypted_api_key(&self.url, &self.api_key, &self.username)
    }

    pub fn client(&self, cipher: &ApiKeyCipher) -> Result<RedmineClient, ConfigError> {
        RedmineClient::new(self.api_options(), cipher.clone())
    }

    /// The cached project tree. A corrupt cache reads as empty.
    pub fn project_tree(&self) -> Vec<Project> {
        parse_project_tree(&self.projects).unwrap_or_else(|e| {
            tracing::warn!(connection = %self.id, "Ignoring unreadable project tree: {}", e);
            Vec::new()
        })
    }

    /// Whether `url` points at the same Redmine host, ignoring a trailing slash.
    pub fn matches_url(&self, url: &str) -> bool {
        self.url.trim_end_matches('/') == url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use redmine::AuthMethod;

    use super::*;

    fn user() -> User {
        User {
            id: 7,
            login: "alice".to_string(),
            firstname: "Alice".to_string(),
            lastname: "Andersson".to_string(),
            mail: Some("alice@example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn name_defaults_to_the_users_display_name() {
        let connection =
            Connection::from_user(" ", "https://redmine.example.com/", &user(), "ct:iv".into());

        assert_eq!(connection.name, "Alice Andersson");
        assert_eq!(connection.url, "https://redmine.example.com");
        assert_eq!(connection.username, "alice");
        assert_eq!(connection.redmine_user_id, 7);
        assert_eq!(connection.email, "alice@example.com");
        assert!(connection.matches_url("https://redmine.example.com/"));
    }

    #[test]
    fn blank_name_keeps_the_saved_one() {
        let mut connection =
            Connection::from_user("Work", "https://redmine.example.com", &user(), "ct:iv".into());

        connection.apply_user("", &user(), "ct2:iv2".into());
        assert_eq!(connection.name, "Work");
        assert_eq!(connection.api_key, "ct2:iv2");

        connection.apply_user(" Office ", &user(), "ct3:iv3".into());
        assert_eq!(connection.name, "Office");
    }

    #[test]
    fn api_options_use_the_encrypted_key() {
        let connection =
            Connection::from_user("Work", "https://redmine.example.com", &user(), "ct:iv".into());

        assert_eq!(
            connection.api_options().auth,
            AuthMethod::EncryptedApiKey {
                ciphertext: "ct:iv".to_string(),
                username: "alice".to_string(),
            }
        );
    }

    #[test]
    fn corrupt_project_cache_reads_as_empty() {
        let mut connection =
            Connection::from_user("Work", "https://redmine.example.com", &user(), "ct:iv".into());
        assert!(connection.project_tree().is_empty());

        connection.projects = "{not json".to_string();
        assert!(connection.project_tree().is_empty());
    }
}
