//! WireGuard interfaces on private networks, and the peers attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiRequest, TelnyxClient};
use crate::enums::api_enum;
use crate::error::ApiError;
use crate::pagination::{Page, PageParams};

api_enum! {
    pub enum InterfaceStatus {
        Created => "created",
        Provisioning => "provisioning",
        Provisioned => "provisioned",
        Deleting => "deleting",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWireguardInterfaceParams {
    pub network_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_sip_trunking: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireguardInterfaceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWireguardInterfacesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<WireguardInterfaceFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireguardInterface {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    pub network_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<InterfaceStatus>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub server_ip_address: Option<String>,
    #[serde(default)]
    pub enable_sip_trunking: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateWireguardPeerParams {
    pub wireguard_interface_id: Uuid,
    /// Generated server-side when omitted; the private key is then returned once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWireguardPeerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireguardPeerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wireguard_interface_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWireguardPeersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<WireguardPeerFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireguardPeer {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    pub wireguard_interface_id: Uuid,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct WireguardInterfaces<'c> {
    client: &'c TelnyxClient,
}

impl<'c> WireguardInterfaces<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_create(
        &self,
        params: &CreateWireguardInterfaceParams,
    ) -> Result<ApiRequest<WireguardInterface>, ApiError> {
        self.client.post("/wireguard_interfaces", params)
    }

    pub fn build_list(
        &self,
        params: &ListWireguardInterfacesParams,
    ) -> Result<ApiRequest<Page<WireguardInterface>>, ApiError> {
        self.client.list("/wireguard_interfaces", params)
    }

    pub fn build_retrieve(&self, id: Uuid) -> ApiRequest<WireguardInterface> {
        self.client.get(&format!("/wireguard_interfaces/{id}"))
    }

    pub fn build_delete(&self, id: Uuid) -> ApiRequest<WireguardInterface> {
        self.client.delete(&format!("/wireguard_interfaces/{id}"))
    }
}

pub struct WireguardPeers<'c> {
    client: &'c TelnyxClient,
}

impl<'c> WireguardPeers<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_create(
        &self,
        params: &CreateWireguardPeerParams,
    ) -> Result<ApiRequest<WireguardPeer>, ApiError> {
        self.client.post("/wireguard_peers", params)
    }

    pub fn build_list(
        &self,
        params: &ListWireguardPeersParams,
    ) -> Result<ApiRequest<Page<WireguardPeer>>, ApiError> {
        self.client.list("/wireguard_peers", params)
    }

    pub fn build_retrieve(&self, id: Uuid) -> ApiRequest<WireguardPeer> {
        self.client.get(&format!("/wireguard_peers/{id}"))
    }

    pub fn build_update(
        &self,
        id: Uuid,
        params: &UpdateWireguardPeerParams,
    ) -> Result<ApiRequest<WireguardPeer>, ApiError> {
        self.client.patch(&format!("/wireguard_peers/{id}"), params)
    }

    pub fn build_delete(&self, id: Uuid) -> ApiRequest<WireguardPeer> {
        self.client.delete(&format!("/wireguard_peers/{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse};

    const NETWORK: &str = "6a09cdc3-8948-47f0-aa62-74ac943d6c58";

    fn client() -> TelnyxClient {
        TelnyxClient::new("http://localhost:3000/v2", "KEY")
    }

    #[test]
    fn build_create_interface_body() {
        let params = CreateWireguardInterfaceParams {
            network_id: NETWORK.parse().unwrap(),
            name: Some("test interface".into()),
            region_code: Some("ashburn-va".into()),
            enable_sip_trunking: None,
        };
        let req = client().wireguard_interfaces().build_create(&params).unwrap();
        assert_eq!(req.http.path, "http://localhost:3000/v2/wireguard_interfaces");
        let body: serde_json::Value = serde_json::from_str(req.http.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"network_id": NETWORK, "name": "test interface", "region_code": "ashburn-va"})
        );
    }

    #[test]
    fn build_list_interfaces_filters_by_network() {
        let params = ListWireguardInterfacesParams {
            filter: Some(WireguardInterfaceFilter {
                network_id: Some(NETWORK.parse().unwrap()),
            }),
            page: None,
        };
        let req = client().wireguard_interfaces().build_list(&params).unwrap();
        assert_eq!(req.http.query_param("filter[network_id]"), Some(NETWORK));
    }

    #[test]
    fn delete_interface_returns_the_record() {
        let req = client().wireguard_interfaces().build_delete(Uuid::nil());
        assert_eq!(req.http.method, HttpMethod::Delete);
        let body = format!(
            r#"{{"data":{{"id":"6a09cdc3-8948-47f0-aa62-74ac943d6c58","record_type":"wireguard_interface","network_id":"{NETWORK}","status":"deleting"}}}}"#
        );
        let iface = req
            .parse(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body,
            })
            .unwrap();
        assert_eq!(iface.status, Some(InterfaceStatus::Deleting));
    }

    #[test]
    fn peer_update_is_patch() {
        let params = UpdateWireguardPeerParams {
            public_key: Some("qF4EqlZq+5tl9SmkxDtQvw6jt2H3YmwFTVoR2xsKMfA=".into()),
        };
        let req = client().wireguard_peers().build_update(Uuid::nil(), &params).unwrap();
        assert_eq!(req.http.method, HttpMethod::Patch);
        assert!(req.http.path.starts_with("http://localhost:3000/v2/wireguard_peers/"));
    }

    #[test]
    fn peer_list_filters_by_interface() {
        let params = ListWireguardPeersParams {
            filter: Some(WireguardPeerFilter {
                wireguard_interface_id: Some(Uuid::nil()),
            }),
            page: Some(PageParams::new(1, 5)),
        };
        let req = client().wireguard_peers().build_list(&params).unwrap();
        assert_eq!(
            req.http.query_param("filter[wireguard_interface_id]"),
            Some("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(req.http.query_param("page[size]"), Some("5"));
    }
}
