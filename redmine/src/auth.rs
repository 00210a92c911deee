use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Host is required.")]
    MissingHost,
    #[error("API key is required.")]
    MissingApiKey,
    #[error("Username is required.")]
    MissingUsername,
    #[error("Password is required.")]
    MissingPassword,
    #[error("Unknown auth type: {0}")]
    UnknownAuthType(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// How requests against a Redmine host are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Plaintext API key, sent as `X-Redmine-API-Key`.
    ApiKey(String),
    /// API key encrypted with [`crate::ApiKeyCipher`] for `username`. Decrypted on every request.
    EncryptedApiKey { ciphertext: String, username: String },
    /// HTTP basic auth.
    Password { username: String, password: String },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::EncryptedApiKey { username, .. } => f
                .debug_struct("EncryptedApiKey")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

impl AuthMethod {
    pub fn auth_type(&self) -> &'static str {
        match self {
            Self::ApiKey(_) | Self::EncryptedApiKey { .. } => "apikey",
            Self::Password { .. } => "password",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::ApiKey(key) if key.trim().is_empty() => Err(ConfigError::MissingApiKey),
            Self::EncryptedApiKey { ciphertext, .. } if ciphertext.trim().is_empty() => {
                Err(ConfigError::MissingApiKey)
            }
            Self::Password { username, .. } if username.trim().is_empty() => {
                Err(ConfigError::MissingUsername)
            }
            Self::Password { password, .. } if password.trim().is_empty() => {
                Err(ConfigError::MissingPassword)
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedmineApiOptions {
    pub host: String,
    pub auth: AuthMethod,
}

impl RedmineApiOptions {
    pub fn new(host: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            auth,
        }
    }

    pub fn with_api_key(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::new(host, AuthMethod::ApiKey(api_key.into()))
    }

    pub fn with_encrypted_api_key(
        host: impl Into<String>,
        ciphertext: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self::new(
            host,
            AuthMethod::EncryptedApiKey {
                ciphertext: ciphertext.into(),
                username: username.into(),
            },
        )
    }

    pub fn with_password(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::new(
            host,
            AuthMethod::Password {
                username: username.into(),
                password: password.into(),
            },
        )
    }

    /// Builds options from the loosely typed form submitted by a connection form.
    ///
    /// `auth_type` defaults to `"apikey"`. With `need_to_decrypt_api_key` the key is treated as
    /// ciphertext encrypted for `username`.
    pub fn from_parts(
        host: &str,
        auth_type: Option<&str>,
        api_key: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        need_to_decrypt_api_key: bool,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.unwrap_or_default().to_string();
        let username = username.unwrap_or_default().to_string();
        let password = password.unwrap_or_default().to_string();

        let auth = match auth_type.unwrap_or("apikey") {
            "apikey" if need_to_decrypt_api_key => AuthMethod::EncryptedApiKey {
                ciphertext: api_key,
                username,
            },
            "apikey" => AuthMethod::ApiKey(api_key),
            "password" => AuthMethod::Password { username, password },
            other => return Err(ConfigError::UnknownAuthType(other.to_string())),
        };

        let options = Self::new(host, auth);
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        self.auth.validate()
    }
}
