// Wire types for the OpenWebif JSON API.
//
// Field names follow the device's JSON exactly (serde renames where the
// wire name is not idiomatic Rust). Nothing here is a domain type --
// `openwebif-core` converts these into its own model.

use serde::{Deserialize, Serialize};

/// Response body of `GET /api/statusinfo`.
///
/// OpenWebif reports `inStandby` as the *string* `"true"` / `"false"`,
/// not a JSON bool. When the box is in standby the current-service
/// fields may be absent entirely, hence the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusInfo {
    #[serde(rename = "inStandby", default = "default_standby")]
    pub in_standby: String,

    #[serde(default)]
    pub muted: bool,

    #[serde(default)]
    pub volume: u8,

    /// Station (channel) name of the current service.
    #[serde(default)]
    pub currservice_station: String,

    /// Name of the programme currently running on the service.
    #[serde(default)]
    pub currservice_name: String,

    /// Device-native service reference of the current channel.
    #[serde(default)]
    pub currservice_serviceref: String,
}

fn default_standby() -> String {
    "true".to_owned()
}

impl StatusInfo {
    /// The box counts as powered only when it literally reports
    /// `inStandby: "false"` -- any other value means standby.
    pub fn powered(&self) -> bool {
        self.in_standby == "false"
    }
}

/// Response body of `GET /api/deviceinfo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub model: String,

    /// Marketing name; present on newer images and preferred over `model`.
    #[serde(default)]
    pub mname: Option<String>,

    #[serde(default)]
    pub webifver: String,

    #[serde(default)]
    pub enigmaver: String,

    #[serde(default)]
    pub kernelver: String,

    #[serde(default)]
    pub chipset: String,
}

impl DeviceInfo {
    /// Model name, preferring the marketing name when the image ships one.
    pub fn model_name(&self) -> &str {
        self.mname.as_deref().unwrap_or(&self.model)
    }
}

/// One bouquet from `GET /api/getallservices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBouquet {
    pub servicename: String,

    #[serde(default)]
    pub subservices: Vec<Subservice>,
}

/// A single tunable service inside a bouquet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subservice {
    #[serde(default)]
    pub servicename: String,

    pub servicereference: String,
}

/// Envelope of `GET /api/getallservices`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AllServices {
    #[serde(default)]
    pub services: Vec<ServiceBouquet>,
}

/// Power-state transitions accepted by `GET /api/powerstate`.
///
/// The numeric codes are fixed by the device firmware. The bridge only
/// drives `Wakeup` and `Standby`; the rest are part of the device API
/// surface and exposed for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Toggle,
    DeepStandby,
    Reboot,
    RestartGui,
    Wakeup,
    Standby,
}

impl PowerAction {
    /// The `newstate` query value for this action.
    pub fn code(self) -> u8 {
        match self {
            Self::Toggle => 0,
            Self::DeepStandby => 1,
            Self::Reboot => 2,
            Self::RestartGui => 3,
            Self::Wakeup => 4,
            Self::Standby => 5,
        }
    }
}
