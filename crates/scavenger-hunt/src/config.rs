//! Configuration for the scavenger hunt service.

use anyhow::{bail, Context, Result};
use hunt_progress::Catalog;
use scan_admission::AdmissionPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Participant storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Hunt catalog configuration
    #[serde(default)]
    pub hunt: HuntConfig,

    /// Scan admission configuration
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Production mode marks the registration cookie `Secure`
    #[serde(default)]
    pub production: bool,

    /// Take the client address from `X-Forwarded-For` (behind a reverse proxy)
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Connection string: `memory://` or `file:///path/to/dir`
    #[serde(default = "default_storage_url")]
    pub url: String,

    /// Upper bound for a single storage call
    #[serde(default = "default_storage_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HuntConfig {
    /// Comma-separated list of valid QR codes
    #[serde(default = "default_codes")]
    pub codes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionConfig {
    /// Length of the per-client window
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Scans admitted per window
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// How often elapsed windows are swept
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            production: false,
            trust_forwarded_for: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_storage_url(),
            timeout_ms: default_storage_timeout_ms(),
        }
    }
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            codes: default_codes(),
        }
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            limit: default_limit(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_storage_url() -> String {
    "file:///data/participants".into()
}

fn default_storage_timeout_ms() -> u64 {
    5000
}

fn default_codes() -> String {
    hunt_progress::DEFAULT_CODES.join(",")
}

fn default_window_secs() -> u64 {
    60
}

fn default_limit() -> u32 {
    1
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl HuntConfig {
    pub fn catalog(&self) -> Catalog {
        Catalog::parse(&self.codes)
    }
}

impl AdmissionConfig {
    pub fn policy(&self) -> AdmissionPolicy {
        AdmissionPolicy::new(Duration::from_secs(self.window_secs), self.limit)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            hunt: HuntConfig::default(),
            admission: AdmissionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `STORAGE__URL=memory://`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.hunt.catalog().is_empty() {
            bail!("hunt.codes must name at least one code");
        }
        if self.admission.window_secs == 0 {
            bail!("admission.window_secs must be positive");
        }
        if self.storage.timeout_ms == 0 {
            bail!("storage.timeout_ms must be positive");
        }
        Ok(())
    }
}
