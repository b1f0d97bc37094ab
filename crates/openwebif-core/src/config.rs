// ── Runtime device configuration ──
//
// These types describe *how* to talk to one box. They carry connection
// and behaviour tuning but never touch disk -- the config crate builds
// a `DeviceConfig` per device and hands it in.

use std::time::Duration;

use openwebif_api::DeviceEndpoint;

/// How the accessory host should surface the volume level, when a plain
/// speaker capability is not enough for the user's controller UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeDisplay {
    /// Speaker capability only.
    #[default]
    Disabled,
    /// Additionally surface volume as a brightness-style slider.
    Brightness,
    /// Additionally surface volume as a fan-speed-style slider.
    RotationSpeed,
}

/// A configured channel: display name plus device-native reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDef {
    pub name: String,
    pub reference: String,
}

/// Accessory-information fallbacks used until (or instead of) the
/// values reported by the box itself.
#[derive(Debug, Clone, Default)]
pub struct IdentityOverrides {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_revision: Option<String>,
}

/// Configuration for a single device session.
///
/// Built by the config crate, passed to `DeviceSession` -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Display name of the device (also the accessory name).
    pub name: String,
    /// Where the box lives and how to authenticate.
    pub endpoint: DeviceEndpoint,
    /// Extra volume surface for the controller UI.
    pub volume_display: VolumeDisplay,
    /// Swap which remote code means "show info" vs "show menu".
    pub switch_info_menu: bool,
    /// Status poll cadence.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Configured channel list, in presentation order.
    pub channels: Vec<ChannelDef>,
    /// Accessory-information fallbacks.
    pub identity: IdentityOverrides,
}

impl DeviceConfig {
    /// A minimal config for the given endpoint, defaults everywhere else.
    pub fn new(name: impl Into<String>, endpoint: DeviceEndpoint) -> Self {
        Self {
            name: name.into(),
            endpoint,
            volume_display: VolumeDisplay::default(),
            switch_info_menu: false,
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(10),
            channels: Vec::new(),
            identity: IdentityOverrides::default(),
        }
    }
}
