//! Service settings: the endpoint and key of the hosted text analytics
//! resource.
//!
//! Settings are read once at startup from a JSON (`appsettings.json`) or TOML
//! file using the keys `AIServicesEndpoint` and `AIServicesKey`. The
//! environment variables `TEXTA_ENDPOINT` and `TEXTA_KEY` override the file.

use figment::{
    Figment,
    providers::{Env, Format, Json, Toml},
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Settings file consulted when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

/// Prefix of the environment variables that override the settings file.
pub const ENV_PREFIX: &str = "TEXTA_";

/// Errors raised while loading [`ServiceConfig`]. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file {} was not found", path.display())]
    MissingFile { path: PathBuf },
    #[error("settings file {} must end in .json or .toml", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("failed to read settings: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("setting `{key}` is missing or empty")]
    MissingValue { key: &'static str },
    #[error("endpoint `{endpoint}` is not a valid URL: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    #[serde(rename = "AIServicesEndpoint")]
    endpoint: Option<String>,
    #[serde(rename = "AIServicesKey")]
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    endpoint: Option<String>,
    key: Option<String>,
}

/// Endpoint and credential of the remote service.
///
/// Immutable once constructed. The endpoint always ends with `/` so routes
/// can be appended directly.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    endpoint: Url,
    key: String,
}

impl ServiceConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] when either value is blank and
    /// [`ConfigError::InvalidEndpoint`] when the endpoint is not an absolute
    /// URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use text_analytics::ServiceConfig;
    ///
    /// let cfg = ServiceConfig::new("https://example.cognitiveservices.azure.com", "secret")
    ///     .expect("valid settings");
    /// assert_eq!(
    ///     cfg.route("text/analytics/v3.1/languages"),
    ///     "https://example.cognitiveservices.azure.com/text/analytics/v3.1/languages"
    /// );
    /// ```
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Result<Self, ConfigError> {
        let mut endpoint = endpoint.into().trim().to_owned();
        let key = key.into().trim().to_owned();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingValue {
                key: "AIServicesEndpoint",
            });
        }
        if key.is_empty() {
            return Err(ConfigError::MissingValue {
                key: "AIServicesKey",
            });
        }
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let endpoint = Url::parse(&endpoint)
            .map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;
        Ok(Self { endpoint, key })
    }

    /// Load settings from `path`, then apply `TEXTA_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is absent or unreadable, or the
    /// resulting values are missing or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = read_file(path.as_ref())?;
        let env: EnvSettings = Figment::new()
            .merge(Env::prefixed(ENV_PREFIX).only(&["endpoint", "key"]))
            .extract()
            .map_err(Box::new)?;
        Self::new(
            env.endpoint.or(file.endpoint).unwrap_or_default(),
            env.key.or(file.key).unwrap_or_default(),
        )
    }

    /// Base URL of the resource, with a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Subscription key sent with every request.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Absolute URL for a route relative to the endpoint.
    #[must_use]
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}

fn read_file(path: &Path) -> Result<FileSettings, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Figment::from(Json::file(path)),
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Figment::from(Toml::file(path)),
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
}
