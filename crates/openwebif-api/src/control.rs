// Control endpoints: power, zap, volume, mute, remote control.
//
// All of these are GET requests with query parameters; the box answers
// with a small `{result, message}` body that carries no information the
// bridge needs, so it is parsed and discarded.

use tracing::debug;
use url::Url;

use crate::client::OpenWebifClient;
use crate::error::Error;
use crate::models::PowerAction;

impl OpenWebifClient {
    /// Request a power-state transition.
    ///
    /// `GET /api/powerstate?newstate=N`
    pub async fn set_power_state(&self, action: PowerAction) -> Result<(), Error> {
        let mut url = self.api_url("powerstate");
        url.query_pairs_mut()
            .append_pair("newstate", &action.code().to_string());
        debug!(?action, "setting power state");
        self.discard(url).await
    }

    /// Tune to a service by its device-native reference.
    ///
    /// `GET /api/zap?sRef=...`
    pub async fn zap(&self, reference: &str) -> Result<(), Error> {
        let mut url = self.api_url("zap");
        url.query_pairs_mut().append_pair("sRef", reference);
        debug!(reference, "zapping");
        self.discard(url).await
    }

    /// Set the absolute volume level.
    ///
    /// `GET /api/vol?set=setNN`
    pub async fn set_volume(&self, level: u8) -> Result<(), Error> {
        let mut url = self.api_url("vol");
        url.query_pairs_mut()
            .append_pair("set", &format!("set{level}"));
        debug!(level, "setting volume");
        self.discard(url).await
    }

    /// Toggle mute. The device offers no absolute mute-set primitive.
    ///
    /// `GET /api/vol?set=mute`
    pub async fn toggle_mute(&self) -> Result<(), Error> {
        let mut url = self.api_url("vol");
        url.query_pairs_mut().append_pair("set", "mute");
        debug!("toggling mute");
        self.discard(url).await
    }

    /// Send a raw remote-control key code.
    ///
    /// `GET /api/remotecontrol?command=N`
    pub async fn send_remote_code(&self, code: u16) -> Result<(), Error> {
        let mut url = self.api_url("remotecontrol");
        url.query_pairs_mut()
            .append_pair("command", &code.to_string());
        debug!(code, "sending remote code");
        self.discard(url).await
    }

    /// GET a control URL and drop the acknowledgement body.
    async fn discard(&self, url: Url) -> Result<(), Error> {
        let _: serde_json::Value = self.get(url).await?;
        Ok(())
    }
}
