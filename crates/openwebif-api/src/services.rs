// Service (channel) list endpoint.

use tracing::debug;

use crate::client::OpenWebifClient;
use crate::error::Error;
use crate::models::{AllServices, ServiceBouquet};

impl OpenWebifClient {
    /// Fetch the full bouquet/service tree known to the box.
    ///
    /// `GET /api/getallservices`
    pub async fn all_services(&self) -> Result<Vec<ServiceBouquet>, Error> {
        let url = self.api_url("getallservices");
        debug!("fetching service list");
        let all: AllServices = self.get(url).await?;
        Ok(all.services)
    }
}
