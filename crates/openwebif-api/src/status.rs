// Status and device-information endpoints.

use tracing::debug;

use crate::client::OpenWebifClient;
use crate::error::Error;
use crate::models::{DeviceInfo, StatusInfo};

impl OpenWebifClient {
    /// Fetch the current playback/standby status.
    ///
    /// `GET /api/statusinfo`
    pub async fn status_info(&self) -> Result<StatusInfo, Error> {
        let url = self.api_url("statusinfo");
        self.get(url).await
    }

    /// Fetch static device metadata (brand, model, firmware versions).
    ///
    /// `GET /api/deviceinfo`
    pub async fn device_info(&self) -> Result<DeviceInfo, Error> {
        let url = self.api_url("deviceinfo");
        debug!("fetching device info");
        self.get(url).await
    }
}
