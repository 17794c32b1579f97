//! OTA Core - Hardware-independent logic for the ESP32 OTA updater
//!
//! Everything that decides *whether* and *how* to update lives here so it can
//! be tested on the host. The firmware crate only wires these pieces to
//! ESP-IDF (WiFi, HTTP client, `EspOta`).

pub mod backoff;
pub mod checksum;
pub mod config;
pub mod image;
pub mod progress;
pub mod status;
pub mod version;

pub use backoff::Backoff;
pub use checksum::{ChecksumError, Sha256Digest};
pub use config::{ConfigError, UpdatePolicy, UpdaterConfig, WifiCredentials};
pub use image::{check_announced_size, FirmwareSink, ImageError, ImageSummary, ImageWriter};
pub use progress::ProgressTracker;
pub use status::UpdateStatus;
pub use version::{decide, UpdateDecision, Version, VersionToken, MAX_TOKEN_LEN};
