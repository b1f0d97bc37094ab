// ── Domain model ──
//
// Canonical state types shared by the synchronizer, the dispatcher, and
// the accessory-facing surface. Wire types from openwebif-api never
// leak past `convert`.

use openwebif_api::DeviceInfo;

use crate::config::IdentityOverrides;

/// One confirmed snapshot of the box, replaced wholesale each poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    pub powered: bool,
    /// Station name of the current channel.
    pub channel_name: String,
    /// Programme currently running on the channel.
    pub event_name: String,
    /// Device-native reference of the current channel.
    pub channel_reference: String,
    /// Mute as presented to the accessory host: forced true while the
    /// box is in standby.
    pub muted: bool,
    pub volume: u8,
}

/// The synchronizer's last confirmed status plus the derived channel
/// identifier. Swapped atomically, never patched field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedState {
    pub status: DeviceStatus,
    /// Index into the channel registry; 0 when the current reference is
    /// not among the configured channels.
    pub channel_identifier: usize,
}

/// Static device metadata for accessory information.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: String,
    pub kernel_version: String,
    pub chipset: String,
}

impl DeviceIdentity {
    /// Merge what the box reports with config-supplied fallbacks.
    /// Overrides win: the user may prefer their own labels.
    pub fn from_device_info(info: &DeviceInfo, overrides: &IdentityOverrides) -> Self {
        Self {
            manufacturer: overrides
                .manufacturer
                .clone()
                .unwrap_or_else(|| info.brand.clone()),
            model: overrides
                .model
                .clone()
                .unwrap_or_else(|| info.model_name().to_owned()),
            serial_number: overrides
                .serial_number
                .clone()
                .unwrap_or_else(|| info.webifver.clone()),
            firmware_revision: overrides
                .firmware_revision
                .clone()
                .unwrap_or_else(|| info.enigmaver.clone()),
            kernel_version: info.kernelver.clone(),
            chipset: info.chipset.clone(),
        }
    }
}

/// Synchronizer state observable by consumers.
///
/// `Unknown` covers both "never seen" and "offline before first
/// contact": the one-time info fetch is retried flat every tick until
/// it succeeds. Once `Tracking`, poll failures keep the last known
/// state and do NOT transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unknown,
    Tracking,
}

/// A changed-field notification pushed to the accessory host.
///
/// Emitted only when the new value differs from [`CachedState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    Power(bool),
    ActiveChannel(usize),
    Mute(bool),
    Volume(u8),
}

/// The fixed capability table a session exposes to the accessory host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Power,
    ActiveChannel,
    Volume,
    Mute,
    RemoteKey,
    InfoMenu,
    /// Per-channel configured names; readable via the registry, writable
    /// via `rename_channel`.
    ConfiguredName,
}

/// A value read back through the capability surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityValue {
    Power(bool),
    ActiveChannel(usize),
    Volume(u8),
    Mute(bool),
}
