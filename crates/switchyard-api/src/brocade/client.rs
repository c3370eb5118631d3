// Brocade NOS REST client
//
// Wraps `reqwest::Client` with the switchport URL scheme of the NOS
// running-config API. The API is stateless: every method is one or more
// independent HTTP requests authenticated with basic auth, and nothing is
// cached between calls.

use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::brocade::xml;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::trunk::{SwitchportMode, TrunkState};

/// HTTP client for one Brocade switch.
///
/// `hostname` is the management base URL including scheme (for example
/// `https://10.0.0.5`); `interface_type` is the NOS interface class the
/// switch's port labels belong to (`TenGigabitEthernet`, ...).
#[derive(Debug, Clone)]
pub struct BrocadeClient {
    http: reqwest::Client,
    hostname: String,
    interface_type: String,
    credentials: Credentials,
}

impl BrocadeClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        hostname: impl Into<String>,
        interface_type: impl Into<String>,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, hostname, interface_type, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        hostname: impl Into<String>,
        interface_type: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            http,
            hostname: hostname.into(),
            interface_type: interface_type.into(),
            credentials,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn interface_type(&self) -> &str {
        &self.interface_type
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build the API URL for `suffix` under an interface's switchport resource.
    ///
    /// Port labels contain slashes (`101/0/10`), so the label is wrapped in
    /// percent-encoded double quotes: `.../TenGigabitEthernet/%22101/0/10%22/...`.
    pub fn interface_url(&self, interface: &str, suffix: &str) -> Result<Url, Error> {
        let base = self.hostname.trim_end_matches('/');
        let full = format!(
            "{base}/rest/config/running/interface/{}/%22{interface}%22/switchport/{suffix}",
            self.interface_type
        );
        Ok(Url::parse(&full)?)
    }

    // ── Switchport operations ────────────────────────────────────────

    /// Read the switchport mode of an interface.
    pub async fn get_mode(&self, interface: &str) -> Result<SwitchportMode, Error> {
        let body = self.get(self.interface_url(interface, "mode")?).await?;
        xml::parse_mode(&body)
    }

    /// Set the switchport mode of an interface.
    pub async fn set_mode(&self, interface: &str, mode: SwitchportMode) -> Result<(), Error> {
        let url = self.interface_url(interface, "mode")?;
        self.put(url, xml::mode_payload(mode)).await
    }

    /// Read the native and tagged VLANs of an interface with a single request.
    pub async fn get_trunk(&self, interface: &str) -> Result<TrunkState, Error> {
        let body = self.get(self.interface_url(interface, "trunk")?).await?;
        xml::parse_trunk(&body)
    }

    /// Add a tagged VLAN, switching the interface to trunk mode first.
    pub async fn add_vlan_to_trunk(&self, interface: &str, vlan: &str) -> Result<(), Error> {
        self.set_mode(interface, SwitchportMode::Trunk).await?;
        let url = self.interface_url(interface, "trunk/allowed/vlan")?;
        self.put(url, xml::add_vlan_payload(vlan)).await
    }

    /// Remove a tagged VLAN. The mode is left untouched.
    pub async fn remove_vlan_from_trunk(&self, interface: &str, vlan: &str) -> Result<(), Error> {
        let url = self.interface_url(interface, "trunk/allowed/vlan")?;
        self.put(url, xml::remove_vlan_payload(vlan)).await
    }

    /// Set the native VLAN.
    ///
    /// A freshly trunked NOS interface tags its native VLAN, so tagging is
    /// switched off before the VLAN is assigned.
    pub async fn set_native_vlan(&self, interface: &str, vlan: &str) -> Result<(), Error> {
        self.set_mode(interface, SwitchportMode::Trunk).await?;
        self.disable_native_tag(interface).await?;
        let url = self.interface_url(interface, "trunk/native-vlan")?;
        self.put(url, xml::native_vlan_payload(vlan)).await
    }

    /// Remove the native VLAN.
    pub async fn remove_native_vlan(&self, interface: &str) -> Result<(), Error> {
        self.delete(self.interface_url(interface, "trunk/native-vlan")?)
            .await
    }

    /// Stop tagging frames on the native VLAN.
    pub async fn disable_native_tag(&self, interface: &str) -> Result<(), Error> {
        self.delete(self.interface_url(interface, "trunk/tag/native-vlan")?)
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }

    async fn put(&self, url: Url, body: String) -> Result<(), Error> {
        debug!(%body, "PUT {}", url);
        let resp = self
            .http
            .put(url)
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .basic_auth(&self.credentials.username, Some(self.credentials.password()))
            .send()
            .await?;
        check_status(resp).await.map(drop)
    }
}

/// Turn a non-2xx response into `Error::Http`, keeping a body preview.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    let preview: String = body.chars().take(200).collect();
    Err(Error::Http {
        status: status.as_u16(),
        url,
        body: preview,
    })
}
