// Legacy API station + infrastructure endpoints
//
// Stations via stat/sta (the live association snapshot), infrastructure
// devices via stat/device (for resolving AP and switch friendly names).

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{InfraDevice, StationEntry};

impl LegacyClient {
    /// List all currently connected stations for a site.
    ///
    /// `GET /api/s/{site}/stat/sta`
    pub async fn list_stations(&self, site: &str) -> Result<Vec<StationEntry>, Error> {
        let url = self.site_url(site, "stat/sta");
        debug!(site, "listing connected stations");
        self.get(url).await
    }

    /// List all infrastructure devices (APs, switches, gateways) for a site.
    ///
    /// `GET /api/s/{site}/stat/device`
    ///
    /// Used to resolve the friendly name behind an `ap_mac` or `sw_mac`
    /// reported by a station. Gateways with built-in radios report their
    /// radio BSSIDs in `vap_table`, which is why the full device list is
    /// needed rather than a per-MAC lookup.
    pub async fn list_devices(&self, site: &str) -> Result<Vec<InfraDevice>, Error> {
        let url = self.site_url(site, "stat/device");
        debug!(site, "listing infrastructure devices");
        self.get(url).await
    }
}
