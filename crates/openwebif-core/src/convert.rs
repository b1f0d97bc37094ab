// ── Wire → domain conversion ──

use openwebif_api::StatusInfo;

use crate::model::DeviceStatus;

impl From<StatusInfo> for DeviceStatus {
    /// Derive the accessory-facing status from one `statusinfo` body.
    ///
    /// Power is the inverse of the standby flag. Mute follows the
    /// muted-when-off policy: a box in standby always presents as
    /// muted, whatever the device-side flag says.
    fn from(info: StatusInfo) -> Self {
        let powered = info.powered();
        Self {
            powered,
            channel_name: info.currservice_station,
            event_name: info.currservice_name,
            channel_reference: info.currservice_serviceref,
            muted: if powered { info.muted } else { true },
            volume: info.volume,
        }
    }
}
