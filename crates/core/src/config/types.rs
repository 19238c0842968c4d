use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dataset::OutputFraming;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Credentials for openfoodfacts.net.
///
/// The Product Opener pair is sent as form fields on the write call, the
/// basic auth pair is attached to every request. All default to empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub productopener_username: String,
    #[serde(default)]
    pub productopener_password: String,
    #[serde(default)]
    pub basic_auth_username: String,
    #[serde(default)]
    pub basic_auth_password: String,
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default)]
    pub framing: OutputFraming,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            framing: OutputFraming::default(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("test_dataset_nutri_from_ciqual.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("test_dataset_percentages_from_po.json")
}

/// HTTP client settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Per-request timeout in seconds. Unset means requests may block forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Values supplied on the command line, applied on top of every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub productopener_username: Option<String>,
    pub productopener_password: Option<String>,
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub framing: Option<OutputFraming>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut Config) {
        let credentials = &mut config.credentials;
        if let Some(value) = self.productopener_username {
            credentials.productopener_username = value;
        }
        if let Some(value) = self.productopener_password {
            credentials.productopener_password = value;
        }
        if let Some(value) = self.basic_auth_username {
            credentials.basic_auth_username = value;
        }
        if let Some(value) = self.basic_auth_password {
            credentials.basic_auth_password = value;
        }
        if let Some(path) = self.input_path {
            config.dataset.input_path = path;
        }
        if let Some(path) = self.output_path {
            config.dataset.output_path = path;
        }
        if let Some(framing) = self.framing {
            config.dataset.framing = framing;
        }
        if self.timeout_secs.is_some() {
            config.remote.timeout_secs = self.timeout_secs;
        }
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub credentials: SanitizedCredentialsConfig,
    pub dataset: DatasetConfig,
    pub remote: RemoteConfig,
}

/// Usernames are shown, passwords only reported as present or not.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCredentialsConfig {
    pub productopener_username: String,
    pub productopener_password_configured: bool,
    pub basic_auth_username: String,
    pub basic_auth_password_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let credentials = &config.credentials;
        Self {
            credentials: SanitizedCredentialsConfig {
                productopener_username: credentials.productopener_username.clone(),
                productopener_password_configured: !credentials.productopener_password.is_empty(),
                basic_auth_username: credentials.basic_auth_username.clone(),
                basic_auth_password_configured: !credentials.basic_auth_password.is_empty(),
            },
            dataset: config.dataset.clone(),
            remote: config.remote.clone(),
        }
    }
}
