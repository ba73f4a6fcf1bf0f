// ── Association source: the one capability the engine needs ──
//
// Both API styles are reduced to a single question per site: which
// stations are associated right now, and to what? The auth style is
// chosen once at configuration time via `connect_source`; downstream
// code only ever sees `dyn AssociationSource`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::integration::IntegrationClient;
use crate::integration::types::{ClientInfo, DeviceInfo};
use crate::legacy::LegacyClient;
use crate::legacy::models::{InfraDevice, StationEntry};
use crate::transport::{TlsMode, TransportConfig};

// ── MAC normalization ────────────────────────────────────────────────

/// Normalize a hardware address to lowercase colon-separated form.
///
/// Accepts colon-, dash-, or dot-separated input as well as bare hex.
/// Anything that doesn't look like 12 hex digits is lowercased and
/// passed through -- lookups against it will simply never match.
pub fn normalize_mac(raw: &str) -> String {
    let hex: String = raw
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect::<String>()
        .to_lowercase();

    if hex.len() == 12 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        hex.as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>()
            .join(":")
    } else {
        raw.to_lowercase()
    }
}

// ── Association data ─────────────────────────────────────────────────

/// One currently-associated station, normalized across API styles.
///
/// For wired stations the uplink switch occupies the `ap_mac`/`ap_name`
/// slot (with the port folded into the name), so presence tracking uses
/// one mechanism for both media.
#[derive(Debug, Clone)]
pub struct Association {
    /// Hardware address, lowercase colon-separated.
    pub mac: String,
    /// Identifier of the AP (or uplink switch) the station is on.
    pub ap_mac: Option<String>,
    /// Friendly name of that AP, best-effort. Unresolvable identifiers
    /// leave this `None` and callers fall back to the raw MAC.
    pub ap_name: Option<String>,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub name: Option<String>,
    pub signal_dbm: Option<i32>,
    pub is_wired: bool,
    pub tx_bytes: Option<i64>,
    pub rx_bytes: Option<i64>,
}

/// The live snapshot of every association on a site, indexed by
/// normalized MAC for case-insensitive exact lookup.
#[derive(Debug, Default)]
pub struct AssociationSnapshot {
    entries: Vec<Association>,
    index: HashMap<String, usize>,
}

impl AssociationSnapshot {
    pub fn new(entries: Vec<Association>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, a)| (a.mac.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Look up a station by hardware address in any common format.
    pub fn get(&self, mac: &str) -> Option<&Association> {
        self.index
            .get(&normalize_mac(mac))
            .map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Association> {
        self.entries.iter()
    }
}

// ── The capability contract ──────────────────────────────────────────

/// A source of live association snapshots for a site.
///
/// Implemented by [`LegacyClient`] and [`IntegrationClient`]; the engine
/// holds a `dyn AssociationSource` and never branches on auth style.
#[async_trait]
pub trait AssociationSource: Send + Sync {
    /// Fetch the full association snapshot for a site.
    ///
    /// A failure here means the whole snapshot is unusable -- callers
    /// must not partially apply it.
    async fn fetch_associations(&self, site: &str) -> Result<AssociationSnapshot, Error>;
}

// ── Legacy implementation ────────────────────────────────────────────

/// Build a MAC → friendly-name index over infrastructure devices,
/// including each device's radio BSSIDs. Gateways with built-in radios
/// (UDM, UDR) report a radio BSSID as the station's `ap_mac`, not the
/// device MAC.
fn infra_name_index(devices: &[InfraDevice]) -> HashMap<String, String> {
    let mut index = HashMap::new();

    for device in devices {
        let Some(name) = device.name.clone().or_else(|| device.model.clone()) else {
            continue;
        };

        index.insert(normalize_mac(&device.mac), name.clone());

        for vap in &device.vap_table {
            for bssid in [vap.bssid.as_deref(), vap.ap_mac.as_deref()]
                .into_iter()
                .flatten()
            {
                index.insert(normalize_mac(bssid), name.clone());
            }
        }
    }

    index
}

fn station_to_association(
    station: StationEntry,
    names: &HashMap<String, String>,
) -> Association {
    let is_wired = station.is_wired.unwrap_or(false);

    // Wired stations: the uplink switch stands in for the AP, with the
    // port folded into the display name so port moves read as roams.
    let (ap_mac, ap_name) = if is_wired {
        let ap_mac = station.sw_mac.as_deref().map(normalize_mac);
        let ap_name = ap_mac.as_ref().and_then(|mac| {
            names.get(mac).map(|name| match station.sw_port {
                Some(port) => format!("{name} port {port}"),
                None => name.clone(),
            })
        });
        (ap_mac, ap_name)
    } else {
        let ap_mac = station.ap_mac.as_deref().map(normalize_mac);
        let ap_name = ap_mac.as_ref().and_then(|mac| names.get(mac).cloned());
        (ap_mac, ap_name)
    };

    Association {
        mac: normalize_mac(&station.mac),
        ap_mac,
        ap_name,
        ip: station.ip,
        hostname: station.hostname,
        name: station.name,
        signal_dbm: station.rssi.or(station.signal),
        is_wired,
        tx_bytes: station.tx_bytes,
        rx_bytes: station.rx_bytes,
    }
}

#[async_trait]
impl AssociationSource for LegacyClient {
    async fn fetch_associations(&self, site: &str) -> Result<AssociationSnapshot, Error> {
        let (stations, devices) = tokio::join!(self.list_stations(site), self.list_devices(site));
        let stations = stations?;
        let devices = devices?;

        let names = infra_name_index(&devices);
        let entries = stations
            .into_iter()
            .map(|s| station_to_association(s, &names))
            .collect();

        Ok(AssociationSnapshot::new(entries))
    }
}

// ── Integration implementation ───────────────────────────────────────

fn client_to_association(client: ClientInfo, devices: &HashMap<String, DeviceInfo>) -> Association {
    let uplink = client
        .uplink_device_id
        .as_deref()
        .and_then(|id| devices.get(id));

    let is_wired = client.client_type.as_deref() == Some("WIRED");

    Association {
        mac: client
            .mac_address
            .as_deref()
            .map(normalize_mac)
            .unwrap_or_default(),
        ap_mac: uplink
            .and_then(|d| d.mac_address.as_deref())
            .map(normalize_mac),
        ap_name: uplink.and_then(|d| d.name.clone().or_else(|| d.model.clone())),
        ip: client.ip_address,
        hostname: None,
        name: client.name,
        signal_dbm: None,
        is_wired,
        tx_bytes: None,
        rx_bytes: None,
    }
}

#[async_trait]
impl AssociationSource for IntegrationClient {
    async fn fetch_associations(&self, site: &str) -> Result<AssociationSnapshot, Error> {
        let site_id = self.resolve_site_id(site).await?;

        let (clients, devices) = tokio::join!(
            self.list_clients(&site_id),
            self.list_devices(&site_id)
        );
        let clients = clients?;
        let devices: HashMap<String, DeviceInfo> = devices?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        let entries = clients
            .into_iter()
            .map(|c| client_to_association(c, &devices))
            .filter(|a| !a.mac.is_empty())
            .collect();

        Ok(AssociationSnapshot::new(entries))
    }
}

// ── Source selection ─────────────────────────────────────────────────

/// How to authenticate with the controller.
#[derive(Debug, Clone)]
pub enum SourceCredentials {
    /// Integration API key.
    ApiKey(SecretString),
    /// Legacy cookie-based session.
    Session {
        username: String,
        password: SecretString,
    },
}

/// Everything needed to reach a controller and pick an auth style.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: Url,
    pub credentials: SourceCredentials,
    pub tls: TlsMode,
    pub timeout: Duration,
}

/// Detect the controller platform, authenticate, and return the
/// association source matching the configured credential style.
///
/// This is the single configuration-time branch between the two API
/// surfaces; everything past this point is `dyn AssociationSource`.
pub async fn connect_source(config: &SourceConfig) -> Result<Arc<dyn AssociationSource>, Error> {
    let transport = TransportConfig {
        tls: config.tls,
        timeout: config.timeout,
        cookie_jar: None,
    };

    let platform = LegacyClient::detect_platform(&config.url, &transport).await?;

    match &config.credentials {
        SourceCredentials::ApiKey(key) => {
            let client = IntegrationClient::from_api_key(&config.url, key, &transport, platform)?;
            Ok(Arc::new(client))
        }
        SourceCredentials::Session { username, password } => {
            let client = LegacyClient::new(config.url.clone(), platform, &transport)?;
            client.login(username, password).await?;
            Ok(Arc::new(client))
        }
    }
}

/// Open an authenticated legacy session client.
///
/// Some surfaces (the IPS event feed) exist only on the legacy API, so
/// callers may need this even when the Integration API serves
/// associations. Requires session-style credentials.
pub async fn connect_session(config: &SourceConfig) -> Result<LegacyClient, Error> {
    let SourceCredentials::Session { username, password } = &config.credentials else {
        return Err(Error::Authentication {
            message: "legacy session requires username/password credentials".into(),
        });
    };

    let transport = TransportConfig {
        tls: config.tls,
        timeout: config.timeout,
        cookie_jar: None,
    };

    let platform = LegacyClient::detect_platform(&config.url, &transport).await?;
    let client = LegacyClient::new(config.url.clone(), platform, &transport)?;
    client.login(username, password).await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_colons() {
        assert_eq!(normalize_mac("AA:BB:CC:DD:EE:FF"), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn normalize_accepts_dashes_and_dots() {
        assert_eq!(normalize_mac("AA-BB-CC-DD-EE-FF"), "aa:bb:cc:dd:ee:ff");
        assert_eq!(normalize_mac("aabb.ccdd.eeff"), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn normalize_accepts_bare_hex() {
        assert_eq!(normalize_mac("AABBCCDDEEFF"), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn normalize_passes_through_garbage() {
        assert_eq!(normalize_mac("Not A Mac"), "not a mac");
    }

    #[test]
    fn snapshot_lookup_is_case_insensitive() {
        let snapshot = AssociationSnapshot::new(vec![Association {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            ap_mac: None,
            ap_name: None,
            ip: None,
            hostname: None,
            name: None,
            signal_dbm: None,
            is_wired: false,
            tx_bytes: None,
            rx_bytes: None,
        }]);

        assert!(snapshot.get("AA:BB:CC:DD:EE:FF").is_some());
        assert!(snapshot.get("AA-BB-CC-DD-EE-FF").is_some());
        assert!(snapshot.get("aabbccddeeff").is_some());
        assert!(snapshot.get("11:22:33:44:55:66").is_none());
    }

    #[test]
    fn wired_station_maps_switch_into_ap_slot() {
        let mut names = HashMap::new();
        names.insert("0a:0b:0c:0d:0e:0f".to_owned(), "Rack Switch".to_owned());

        let station = StationEntry {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            hostname: None,
            name: None,
            ip: Some("10.0.0.9".into()),
            is_wired: Some(true),
            ap_mac: None,
            sw_mac: Some("0A:0B:0C:0D:0E:0F".into()),
            sw_port: Some(12),
            rssi: None,
            signal: None,
            essid: None,
            tx_bytes: None,
            rx_bytes: None,
            uptime: None,
            extra: serde_json::Map::new(),
        };

        let assoc = station_to_association(station, &names);
        assert_eq!(assoc.ap_mac.as_deref(), Some("0a:0b:0c:0d:0e:0f"));
        assert_eq!(assoc.ap_name.as_deref(), Some("Rack Switch port 12"));
        assert!(assoc.is_wired);
    }

    #[test]
    fn unresolved_ap_keeps_identifier_verbatim() {
        let station = StationEntry {
            mac: "aa:bb:cc:dd:ee:ff".into(),
            hostname: None,
            name: None,
            ip: None,
            is_wired: Some(false),
            ap_mac: Some("de:ad:be:ef:00:01".into()),
            sw_mac: None,
            sw_port: None,
            rssi: Some(-61),
            signal: None,
            essid: None,
            tx_bytes: None,
            rx_bytes: None,
            uptime: None,
            extra: serde_json::Map::new(),
        };

        let assoc = station_to_association(station, &HashMap::new());
        assert_eq!(assoc.ap_mac.as_deref(), Some("de:ad:be:ef:00:01"));
        assert_eq!(assoc.ap_name, None);
        assert_eq!(assoc.signal_dbm, Some(-61));
    }
}
