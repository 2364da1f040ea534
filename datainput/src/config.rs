use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Missing required value: {0}")]
    MissingValue(&'static str),

    #[error("Ingest path must start with '/': {0}")]
    InvalidIngestPath(String),

    #[error("Downstream trigger URL is invalid: {0}")]
    InvalidDownstreamUrl(String),
}

/// Data input service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming ingest requests
    pub listener: Listener,
    /// Optional listener for health and readiness probes
    #[serde(default)]
    pub admin_listener: Option<Listener>,
    /// Path of the single ingest endpoint
    #[serde(default = "default_ingest_path")]
    pub ingest_path: String,
    /// Where enriched records are appended
    pub storage: StorageConfig,
    /// Regeneration job kicked off after every stored record
    pub downstream: DownstreamConfig,
    /// Operator push notification channel
    pub notifier: NotifierConfig,
}

fn default_ingest_path() -> String {
    "/api/datainput".into()
}

impl Config {
    /// Validates the data input configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        if let Some(admin) = &self.admin_listener {
            admin.validate()?;
        }

        if !self.ingest_path.starts_with('/') {
            return Err(ValidationError::InvalidIngestPath(self.ingest_path.clone()));
        }

        self.storage.validate()?;
        self.downstream.validate()?;
        self.notifier.validate()?;

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// One JSON line per record, one file per partition
    Filesystem { base_dir: String },
    /// Table-style REST endpoint accepting one JSON record per POST
    Http { url: Url },
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StorageConfig::Filesystem { base_dir } if base_dir.is_empty() => {
                Err(ValidationError::MissingValue("storage.base_dir"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => f.write_str("http"),
            Scheme::Https => f.write_str("https"),
        }
    }
}

/// Downstream regeneration trigger
///
/// `host` and `key` may be left empty in the file and supplied through the
/// environment instead; they are checked by `validate` either way.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DownstreamConfig {
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_downstream_path")]
    pub path: String,
    /// Shared secret sent as the `code` query parameter
    #[serde(default)]
    pub key: String,
}

fn default_downstream_path() -> String {
    "/api/htmlgenerator".into()
}

impl DownstreamConfig {
    /// Full trigger URL, without the secret.
    pub fn url(&self) -> Result<Url, ValidationError> {
        let raw = format!("{}://{}{}", self.scheme, self.host, self.path);
        Url::parse(&raw).map_err(|e| ValidationError::InvalidDownstreamUrl(format!("{raw}: {e}")))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::MissingValue("downstream.host"));
        }
        if self.key.is_empty() {
            return Err(ValidationError::MissingValue("downstream.key"));
        }
        self.url()?;
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_url")]
    pub url: Url,
    /// Device the push notifications are addressed to
    #[serde(default)]
    pub device_id: String,
}

fn default_notifier_url() -> Url {
    Url::parse("https://wirepusher.com/send").expect("static URL is valid")
}

impl NotifierConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.is_empty() {
            return Err(ValidationError::MissingValue("notifier.device_id"));
        }
        Ok(())
    }
}
