use std::{path::Path, path::PathBuf, str::FromStr};

use redmine::{ApiKeyCipher, CryptoError};
use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub crypto: CryptoSettings,
    pub storage: StorageSettings,
    pub redmine: RedmineSettings,
}

#[derive(Deserialize, Clone, Default)]
pub struct CryptoSettings {
    #[serde(default)]
    pub api_key_secret: String,
}

impl std::fmt::Debug for CryptoSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSettings").finish_non_exhaustive()
    }
}

impl CryptoSettings {
    /// The cipher for stored API keys. A missing or malformed secret is an error, never defaulted.
    pub fn cipher(&self) -> Result<ApiKeyCipher, CryptoError> {
        ApiKeyCipher::from_base64(&self.api_key_secret)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub connections_path: PathBuf,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct RedmineSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub page_size: u32,
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .map_err(|e| config::ConfigError::Message(format!("Failed to parse APP_ENVIRONMENT: {e}")))?;

    read_config_from(&config_directory, &environment)
}

pub fn read_config_from(
    config_directory: &Path,
    environment: &Environment,
) -> Result<Settings, config::ConfigError> {
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("HOURS")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
