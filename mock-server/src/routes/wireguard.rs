//! WireGuard interfaces (one per network) and their peers. Deleting an
//! interface removes its peers.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{data, page_of, ApiFailure, ApiPath, ApiResult, Db, Store};

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub network_id: Uuid,
    pub name: Option<String>,
    pub status: &'static str,
    pub region_code: String,
    pub endpoint: String,
    pub public_key: String,
    pub server_ip_address: String,
    pub enable_sip_trunking: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub wireguard_interface_id: Uuid,
    pub public_key: String,
    /// Only present in the response to a create that generated the key pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CreateInterfaceInput {
    network_id: Uuid,
    name: Option<String>,
    region_code: Option<String>,
    #[serde(default)]
    enable_sip_trunking: bool,
}

#[derive(Debug, Deserialize)]
struct CreatePeerInput {
    wireguard_interface_id: Uuid,
    public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatePeerInput {
    public_key: Option<String>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/wireguard_interfaces", post(create_interface).get(list_interfaces))
        .route(
            "/wireguard_interfaces/{id}",
            get(retrieve_interface).delete(delete_interface),
        )
        .route("/wireguard_peers", post(create_peer).get(list_peers))
        .route(
            "/wireguard_peers/{id}",
            get(retrieve_peer).patch(update_peer).delete(delete_peer),
        )
}

/// 44-character base64-looking key; uniqueness is all the mock needs.
fn fake_key() -> String {
    let raw = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    format!("{}=", &raw[..43])
}

async fn create_interface(
    State(db): State<Db>,
    payload: Result<Json<CreateInterfaceInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    if store.interfaces.iter().any(|i| i.network_id == input.network_id) {
        return Err(ApiFailure::invalid(
            "/network_id",
            "the network already has a WireGuard interface",
        ));
    }

    let now = Utc::now();
    let octet = store.interfaces.len() % 250 + 1;
    let record = InterfaceRecord {
        id: Uuid::new_v4(),
        record_type: "wireguard_interface",
        network_id: input.network_id,
        name: input.name,
        status: "provisioning",
        region_code: input.region_code.unwrap_or_else(|| "ashburn-va".into()),
        endpoint: format!("64.16.243.{octet}:5107"),
        public_key: fake_key(),
        server_ip_address: format!("198.51.100.{octet}/32"),
        enable_sip_trunking: input.enable_sip_trunking,
        created_at: now,
        updated_at: now,
    };
    store.interfaces.push(record.clone());
    data(StatusCode::ACCEPTED, record)
}

async fn list_interfaces(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> ApiResult {
    let network = query.get("filter[network_id]");
    let store = db.read().await;
    let items: Vec<&InterfaceRecord> = store
        .interfaces
        .iter()
        .filter(|i| network.map_or(true, |n| i.network_id.to_string() == *n))
        .collect();
    page_of(items, &query)
}

async fn retrieve_interface(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let store = db.read().await;
    data(StatusCode::OK, find_interface(&store, id)?)
}

async fn delete_interface(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let index = store
        .interfaces
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(|| ApiFailure::not_found("WireGuard interface"))?;
    let mut record = store.interfaces.remove(index);
    store.peers.retain(|p| p.wireguard_interface_id != id);
    record.status = "deleting";
    record.updated_at = Utc::now();
    data(StatusCode::OK, record)
}

async fn create_peer(
    State(db): State<Db>,
    payload: Result<Json<CreatePeerInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    if find_interface(&store, input.wireguard_interface_id).is_err() {
        return Err(ApiFailure::invalid(
            "/wireguard_interface_id",
            "the WireGuard interface does not exist",
        ));
    }

    let (public_key, private_key) = match input.public_key {
        Some(key) if !key.is_empty() => (key, None),
        _ => (fake_key(), Some(fake_key())),
    };
    let now = Utc::now();
    let record = PeerRecord {
        id: Uuid::new_v4(),
        record_type: "wireguard_peer",
        wireguard_interface_id: input.wireguard_interface_id,
        public_key,
        private_key,
        last_seen: None,
        created_at: now,
        updated_at: now,
    };
    let response = data(StatusCode::CREATED, &record);
    store.peers.push(PeerRecord {
        private_key: None,
        ..record
    });
    response
}

async fn list_peers(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> ApiResult {
    let interface = query.get("filter[wireguard_interface_id]");
    let store = db.read().await;
    let items: Vec<&PeerRecord> = store
        .peers
        .iter()
        .filter(|p| interface.map_or(true, |i| p.wireguard_interface_id.to_string() == *i))
        .collect();
    page_of(items, &query)
}

async fn retrieve_peer(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let store = db.read().await;
    data(StatusCode::OK, find_peer(&store, id)?)
}

async fn update_peer(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<UpdatePeerInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    let peer = store
        .peers
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| ApiFailure::not_found("WireGuard peer"))?;
    if let Some(key) = input.public_key {
        if key.is_empty() {
            return Err(ApiFailure::invalid("/public_key", "public_key cannot be empty"));
        }
        peer.public_key = key;
    }
    peer.updated_at = Utc::now();
    data(StatusCode::OK, &*peer)
}

async fn delete_peer(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let index = store
        .peers
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| ApiFailure::not_found("WireGuard peer"))?;
    data(StatusCode::OK, store.peers.remove(index))
}

fn find_interface(store: &Store, id: Uuid) -> Result<&InterfaceRecord, ApiFailure> {
    store
        .interfaces
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| ApiFailure::not_found("WireGuard interface"))
}

fn find_peer(store: &Store, id: Uuid) -> Result<&PeerRecord, ApiFailure> {
    store
        .peers
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| ApiFailure::not_found("WireGuard peer"))
}
