// Poll client for the dashboard snapshot endpoint.
//
// Wraps `reqwest::Client` with the backend's URL layout. One method, one
// endpoint: GET /api/dashboard returns the full current status with flat
// counter fields, which `StatusSnapshot::from_dashboard_value` repackages
// into the nested shape the reconciler consumes.

use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::Error;
use crate::snapshot::StatusSnapshot;
use crate::transport::TransportConfig;

/// HTTP poll client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl DashboardClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let endpoint = base_url.join("api/dashboard")?;
        Ok(Self { http, endpoint })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Result<Self, Error> {
        let endpoint = base_url.join("api/dashboard")?;
        Ok(Self { http, endpoint })
    }

    /// The resolved snapshot endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the current status snapshot.
    pub async fn fetch_snapshot(&self) -> Result<StatusSnapshot, Error> {
        trace!(url = %self.endpoint, "polling dashboard endpoint");

        let response = self.http.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })?;
        Ok(StatusSnapshot::from_dashboard_value(&body))
    }
}
