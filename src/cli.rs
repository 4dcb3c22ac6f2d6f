//! CLI argument types and layered configuration for the `rest-client` and
//! `sdk-client` binaries. Loads from CLI args, environment (prefix `TEXTA_`),
//! and optional config files.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_SETTINGS_FILE;
use crate::transport::ClientOptions;

/// Command-line arguments shared by both binaries.
///
/// Values are loaded from command line arguments, environment variables
/// (prefixed with `TEXTA_`), and an optional TOML configuration file.
///
/// # Examples
///
/// ```
/// use text_analytics::cli::ClientArgs;
/// use ortho_config::OrthoConfig;
///
/// let args = ClientArgs::load_from_iter(["rest-client", "--echo-json=true"])
///     .expect("load args from CLI iterator");
/// assert!(args.echo_json);
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "TEXTA")]
pub struct ClientArgs {
    /// Settings file holding `AIServicesEndpoint` and `AIServicesKey`.
    #[serde(default)]
    pub settings: Option<PathBuf>,

    /// Print request and response JSON (raw REST client only).
    #[ortho_config(default = false)]
    #[serde(default)]
    pub echo_json: bool,

    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between polls of a summary job, in milliseconds.
    #[ortho_config(default = 1000)]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl ClientArgs {
    /// Settings file to read, falling back to `appsettings.json`.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// HTTP client tunables derived from the arguments.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            ..ClientOptions::default()
        }
    }
}

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn try_init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn second_tracing_init_reports_error() {
        // The first call may lose to another test that installed a subscriber.
        let _first = try_init_tracing();
        assert!(try_init_tracing().is_err());
    }
}
