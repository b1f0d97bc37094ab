//! Configuration for the zapbridge daemon.
//!
//! TOML device descriptors, environment overrides, per-device
//! validation, and translation to `openwebif_core::DeviceConfig`. A
//! descriptor that fails validation skips only that device -- the
//! daemon keeps the rest.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use openwebif_core::{ChannelDef, DeviceConfig, DeviceEndpoint, IdentityOverrides, VolumeDisplay};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("device '{device}' has auth enabled but no credentials")]
    MissingCredentials { device: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Where per-device state (channel cache, rename maps) lives.
    /// Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Configured devices.
    #[serde(default)]
    pub devices: Vec<DeviceProfile>,
}

/// One device descriptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Accessory display name. Required.
    #[serde(default)]
    pub name: String,

    /// Hostname or IP of the box. Required.
    #[serde(default)]
    pub host: String,

    /// OpenWebif HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Embed credentials in request URLs.
    #[serde(default)]
    pub auth: bool,

    pub username: Option<String>,

    /// Password in plaintext, matching the box's own web login.
    pub password: Option<String>,

    /// "none", "brightness", or "rotation".
    #[serde(default = "default_volume_display")]
    pub volume_display: String,

    /// Swap which remote code means "show info" vs "show menu".
    #[serde(default)]
    pub switch_info_menu: bool,

    /// Status poll cadence in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Channel list, in presentation order.
    #[serde(default)]
    pub channels: Vec<ChannelProfile>,

    // Accessory-information fallbacks.
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_revision: Option<String>,
}

/// One configured channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelProfile {
    pub name: String,
    pub reference: String,
}

fn default_port() -> u16 {
    80
}
fn default_volume_display() -> String {
    "none".into()
}
fn default_poll_interval() -> u64 {
    3
}
fn default_timeout() -> u64 {
    10
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "zapbridge", "zapbridge").map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the default data directory for per-device state.
pub fn data_path() -> PathBuf {
    ProjectDirs::from("com", "zapbridge", "zapbridge").map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(prefix: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(prefix);
    p.push("zapbridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// `path` overrides the canonical config location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("ZAPBRIDGE_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Validation & conversion ─────────────────────────────────────────

impl DeviceProfile {
    /// Check the descriptor for device-level configuration errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "name".into(),
                reason: "device name is required".into(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: format!("device '{}' has no host", self.name),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Validation {
                field: "port".into(),
                reason: format!("device '{}' has port 0", self.name),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "poll_interval_secs".into(),
                reason: format!("device '{}' has a zero poll interval", self.name),
            });
        }
        if self.auth && (self.username.is_none() || self.password.is_none()) {
            return Err(ConfigError::MissingCredentials {
                device: self.name.clone(),
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for channel in &self.channels {
            if channel.reference.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: "channels".into(),
                    reason: format!(
                        "device '{}': channel '{}' has an empty reference",
                        self.name, channel.name
                    ),
                });
            }
            if !seen.insert(channel.reference.as_str()) {
                return Err(ConfigError::Validation {
                    field: "channels".into(),
                    reason: format!(
                        "device '{}': duplicate channel reference '{}'",
                        self.name, channel.reference
                    ),
                });
            }
        }

        parse_volume_display(&self.volume_display).map(|_| ())
    }

    /// Translate this descriptor into a core `DeviceConfig`.
    pub fn to_device_config(&self) -> Result<DeviceConfig, ConfigError> {
        self.validate()?;

        let endpoint = if self.auth {
            // validate() guarantees both credentials are present.
            let username = self.username.clone().unwrap_or_default();
            let password = self.password.clone().unwrap_or_default();
            DeviceEndpoint::with_auth(
                self.host.clone(),
                self.port,
                username,
                SecretString::from(password),
            )
        } else {
            DeviceEndpoint::new(self.host.clone(), self.port)
        };

        Ok(DeviceConfig {
            name: self.name.clone(),
            endpoint,
            volume_display: parse_volume_display(&self.volume_display)?,
            switch_info_menu: self.switch_info_menu,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            channels: self
                .channels
                .iter()
                .map(|c| ChannelDef {
                    name: c.name.clone(),
                    reference: c.reference.clone(),
                })
                .collect(),
            identity: IdentityOverrides {
                manufacturer: self.manufacturer.clone(),
                model: self.model.clone(),
                serial_number: self.serial_number.clone(),
                firmware_revision: self.firmware_revision.clone(),
            },
        })
    }
}

fn parse_volume_display(raw: &str) -> Result<VolumeDisplay, ConfigError> {
    match raw {
        "none" => Ok(VolumeDisplay::Disabled),
        "brightness" => Ok(VolumeDisplay::Brightness),
        "rotation" => Ok(VolumeDisplay::RotationSpeed),
        other => Err(ConfigError::Validation {
            field: "volume_display".into(),
            reason: format!("expected 'none', 'brightness', or 'rotation', got '{other}'"),
        }),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
