// Legacy API IPS/IDS event endpoint
//
// The threat feed has no Integration API equivalent, so the threat
// monitor always goes through the legacy surface.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::IpsEventEntry;

impl LegacyClient {
    /// Fetch IPS/IDS events for a site within a millisecond time window.
    ///
    /// `POST /api/s/{site}/stat/ips/event` with `{"start", "end", "_limit"}`.
    /// Timestamps are milliseconds since the epoch, as the controller expects.
    pub async fn list_threat_events(
        &self,
        site: &str,
        start_ms: i64,
        end_ms: i64,
        limit: u32,
    ) -> Result<Vec<IpsEventEntry>, Error> {
        let url = self.site_url(site, "stat/ips/event");
        debug!(site, start_ms, end_ms, limit, "fetching IPS events");

        self.post(
            url,
            &json!({
                "start": start_ms,
                "end": end_ms,
                "_limit": limit,
            }),
        )
        .await
    }
}
