// Hand-crafted async HTTP client for the UniFi Network Integration API.
//
// Base path: /integration/v1/
// Auth: X-API-KEY header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{ClientInfo, DeviceInfo, Page, SiteInfo};
use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Page size for list endpoints. The controller caps pages at 200.
const PAGE_LIMIT: i64 = 200;

// ── Error response shape from the Integration API ────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the UniFi Integration API.
///
/// Uses API-key authentication and communicates via JSON REST endpoints
/// under `/integration/v1/`.
pub struct IntegrationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IntegrationClient {
    /// Build from an API key, transport config, and detected platform.
    ///
    /// Injects `X-API-KEY` as a default header on every request.
    /// On UniFi OS the base path is `/proxy/network/integration/`;
    /// on standalone controllers it's just `/integration/`.
    pub fn from_api_key(
        base_url: &Url,
        api_key: &SecretString,
        transport: &TransportConfig,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("X-API-KEY", key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url, platform)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &Url,
        http: reqwest::Client,
        platform: ControllerPlatform,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url, platform)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL with correct platform prefix + `/integration/`.
    fn normalize_base_url(raw: &Url, platform: ControllerPlatform) -> Result<Url, Error> {
        let mut url = raw.clone();
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/integration") {
            url.set_path(&format!("{path}/"));
        } else {
            let prefix = platform.integration_prefix();
            url.set_path(&format!("{path}{prefix}/"));
        }

        Ok(url)
    }

    /// Join a relative path (e.g. `"v1/sites"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/integration/`, so joining `v1/…` works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::InvalidApiKey);
        }

        let body = resp.text().await?;

        if !status.is_success() {
            let parsed: ErrorResponse = serde_json::from_str(&body).unwrap_or(ErrorResponse {
                message: None,
                code: None,
            });
            return Err(Error::Integration {
                message: parsed.message.unwrap_or_else(|| body.clone()),
                code: parsed.code,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Drain a paged endpoint by following offsets until the last page.
    async fn collect_pages<T, F, Fut>(&self, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(i64) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut items = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let page = fetch(offset).await?;
            let received = i64::try_from(page.data.len()).unwrap_or(0);
            items.extend(page.data);

            offset += received;
            if received < PAGE_LIMIT || offset >= page.total_count {
                break;
            }
        }

        Ok(items)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// One page of `GET /v1/sites`.
    pub async fn list_sites_page(&self, offset: i64, limit: i64) -> Result<Page<SiteInfo>, Error> {
        self.get(
            "v1/sites",
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// One page of `GET /v1/sites/{siteId}/clients`.
    pub async fn list_clients_page(
        &self,
        site_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Page<ClientInfo>, Error> {
        self.get(
            &format!("v1/sites/{site_id}/clients"),
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// One page of `GET /v1/sites/{siteId}/devices`.
    pub async fn list_devices_page(
        &self,
        site_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Page<DeviceInfo>, Error> {
        self.get(
            &format!("v1/sites/{site_id}/devices"),
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// List all sites visible to the API key.
    pub async fn list_sites(&self) -> Result<Vec<SiteInfo>, Error> {
        self.collect_pages(|offset| self.list_sites_page(offset, PAGE_LIMIT))
            .await
    }

    /// List all currently connected clients for a site.
    pub async fn list_clients(&self, site_id: &str) -> Result<Vec<ClientInfo>, Error> {
        self.collect_pages(|offset| self.list_clients_page(site_id, offset, PAGE_LIMIT))
            .await
    }

    /// List all infrastructure devices for a site.
    pub async fn list_devices(&self, site_id: &str) -> Result<Vec<DeviceInfo>, Error> {
        self.collect_pages(|offset| self.list_devices_page(site_id, offset, PAGE_LIMIT))
            .await
    }

    /// Resolve a site name (legacy name, display name, or raw id) to the
    /// site UUID the Integration API addresses endpoints by.
    pub async fn resolve_site_id(&self, site: &str) -> Result<String, Error> {
        let sites = self.list_sites().await?;

        sites
            .into_iter()
            .find(|s| {
                s.id == site
                    || s.internal_reference.as_deref() == Some(site)
                    || s.name.as_deref() == Some(site)
            })
            .map(|s| s.id)
            .ok_or_else(|| Error::SiteNotFound { site: site.into() })
    }
}
