/// Updater configuration that can be validated independently of the hardware
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest image accepted by default (size of one app slot in the partition table)
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} is empty")]
    Empty { field: &'static str },
    #[error("{field} must be an http:// or https:// URL, got '{value}'")]
    BadUrl { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// How the served version token is compared against the running one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Any token that differs from the running version triggers an update
    #[default]
    AnyDifferent,
    /// Only a strictly newer dotted version triggers an update
    NewerOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::Empty { field: "wifi ssid" });
        }
        Ok(())
    }

    /// An empty password means an open network
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }

    /// Password representation that is safe to log
    pub fn redacted_password(&self) -> &'static str {
        if self.password.is_empty() {
            "<empty>"
        } else {
            "<set>"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpdaterConfig {
    // Endpoints
    pub version_url: String,
    pub firmware_url: String,
    pub checksum_url: Option<String>,

    // Timing
    pub http_timeout_ms: u32,
    pub startup_delay_ms: u32,
    pub heartbeat_interval_ms: u32,
    /// 0 checks once at boot and never again
    pub check_interval_secs: u32,

    // Behaviour
    pub wifi_max_retries: u32,
    pub policy: UpdatePolicy,
    pub max_image_size: usize,
    pub log_level: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            version_url: String::new(),
            firmware_url: String::new(),
            checksum_url: None,
            http_timeout_ms: 5_000,
            startup_delay_ms: 5_000,
            heartbeat_interval_ms: 3_000,
            check_interval_secs: 24 * 60 * 60,
            wifi_max_retries: 10,
            policy: UpdatePolicy::AnyDifferent,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl UpdaterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("version_url", &self.version_url)?;
        check_url("firmware_url", &self.firmware_url)?;
        if let Some(url) = &self.checksum_url {
            check_url("checksum_url", url)?;
        }

        if self.http_timeout_ms == 0 {
            return Err(ConfigError::Zero { field: "http_timeout_ms" });
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "heartbeat_interval_ms" });
        }
        if self.wifi_max_retries == 0 {
            return Err(ConfigError::Zero { field: "wifi_max_retries" });
        }
        if self.max_image_size == 0 {
            return Err(ConfigError::Zero { field: "max_image_size" });
        }

        if log_level_from_str(&self.log_level).is_none() {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }

        Ok(())
    }

    /// Connect attempts at startup, never fewer than one even when the
    /// stored value failed validation
    pub fn wifi_attempts(&self) -> u32 {
        self.wifi_max_retries.max(1)
    }

    pub fn is_one_shot(&self) -> bool {
        self.check_interval_secs == 0
    }

    /// Fill endpoints that are empty with the given fallback values
    pub fn backfill_endpoints(&mut self, fallback: &UpdaterConfig) -> bool {
        let mut changed = false;
        if self.version_url.is_empty() && !fallback.version_url.is_empty() {
            self.version_url = fallback.version_url.clone();
            changed = true;
        }
        if self.firmware_url.is_empty() && !fallback.firmware_url.is_empty() {
            self.firmware_url = fallback.firmware_url.clone();
            changed = true;
        }
        if self.checksum_url.is_none() && fallback.checksum_url.is_some() {
            self.checksum_url = fallback.checksum_url.clone();
            changed = true;
        }
        changed
    }
}

/// Parse a log level name the same way on host and device
pub fn log_level_from_str(level: &str) -> Option<log::LevelFilter> {
    let lf = match level.to_ascii_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" | "warning" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => return None,
    };
    Some(lf)
}

/// Treat an empty string as "not configured"
pub fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ConfigError::BadUrl {
            field,
            value: value.to_string(),
        }),
    }
}
