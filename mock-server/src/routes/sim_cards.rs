use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{data, list as query_list, page_of, ApiFailure, ApiPath, ApiResult, Db, Store};

pub const SEEDED_GROUP_ID: &str = "47a1c2b0-cc7b-4ab1-bb98-b33fb0fc61b9";

#[derive(Debug, Clone, Serialize)]
pub struct SimCardRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub iccid: String,
    pub imsi: String,
    pub msisdn: String,
    pub status: Value,
    #[serde(rename = "type")]
    pub sim_type: &'static str,
    pub sim_card_group_id: Uuid,
    pub tags: Vec<String>,
    pub authorized_imeis: Vec<String>,
    pub data_limit: Option<Value>,
    pub current_billing_period_consumed_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SimCardRecord {
    fn status(&self) -> &str {
        self.status["value"].as_str().unwrap_or_default()
    }

    fn set_status(&mut self, value: &str) {
        self.status = json!({ "value": value });
        self.updated_at = Utc::now();
    }
}

/// Five cards created a minute apart, oldest first.
pub fn seed() -> Vec<SimCardRecord> {
    let group: Uuid = SEEDED_GROUP_ID.parse().unwrap_or_default();
    let base = Utc::now() - Duration::hours(1);
    let fixtures: [(&str, &[&str], &'static str); 5] = [
        ("enabled", &["iot", "fleet"], "physical"),
        ("enabled", &["iot"], "physical"),
        ("disabled", &["fleet"], "esim"),
        ("standby", &[], "esim"),
        ("enabled", &["iot", "fleet", "eu"], "physical"),
    ];
    fixtures
        .into_iter()
        .enumerate()
        .map(|(i, (status, tags, sim_type))| {
            let created = base + Duration::minutes(i as i64);
            SimCardRecord {
                id: Uuid::new_v4(),
                record_type: "sim_card",
                iccid: format!("8901260020000000{i:03}"),
                imsi: format!("31026000000{i:04}"),
                msisdn: format!("+1303555{i:04}"),
                status: json!({ "value": status }),
                sim_type,
                sim_card_group_id: group,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                authorized_imeis: Vec::new(),
                data_limit: None,
                current_billing_period_consumed_data: json!({ "amount": "0", "unit": "MB" }),
                created_at: created,
                updated_at: created,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct UpdateInput {
    sim_card_group_id: Option<Uuid>,
    tags: Option<Vec<String>>,
    authorized_imeis: Option<Vec<String>>,
    data_limit: Option<Value>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/sim_cards", get(list))
        .route("/sim_cards/{id}", get(retrieve).patch(update).delete(remove))
        .route("/sim_cards/{id}/actions/{action}", post(apply_action))
}

/// `filter[tags]` matches cards carrying all the given tags; `filter[status]`
/// matches any of the given statuses.
async fn list(State(db): State<Db>, Query(pairs): Query<Vec<(String, String)>>) -> ApiResult {
    let tags = query_list(&pairs, "filter[tags]");
    let statuses = query_list(&pairs, "filter[status]");
    let query: HashMap<String, String> = pairs.into_iter().collect();
    let iccid = query.get("filter[iccid]");
    let group = query.get("filter[sim_card_group_id]");

    let store = db.read().await;
    let mut items: Vec<&SimCardRecord> = store
        .sim_cards
        .iter()
        .filter(|c| tags.iter().all(|t| c.tags.contains(t)))
        .filter(|c| statuses.is_empty() || statuses.iter().any(|s| s == c.status()))
        .filter(|c| iccid.map_or(true, |i| c.iccid.starts_with(i.as_str())))
        .filter(|c| group.map_or(true, |g| c.sim_card_group_id.to_string() == *g))
        .collect();
    match query.get("sort").map(String::as_str) {
        Some("-created_at") => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Some("created_at") | None => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        Some(other) => return Err(ApiFailure::invalid("sort", format!("unsupported sort {other}"))),
    }
    page_of(items, &query)
}

async fn retrieve(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let store = db.read().await;
    data(StatusCode::OK, find(&store, id)?)
}

async fn update(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<UpdateInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    let card = find_mut(&mut store, id)?;
    if let Some(group) = input.sim_card_group_id {
        card.sim_card_group_id = group;
    }
    if let Some(tags) = input.tags {
        card.tags = tags;
    }
    if let Some(imeis) = input.authorized_imeis {
        card.authorized_imeis = imeis;
    }
    if let Some(limit) = input.data_limit {
        card.data_limit = Some(limit);
    }
    card.updated_at = Utc::now();
    data(StatusCode::OK, &*card)
}

async fn remove(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let index = store
        .sim_cards
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("SIM card"))?;
    let card = store.sim_cards.remove(index);
    data(StatusCode::OK, card)
}

/// Actions are accepted with 202; the card moves to its target state at once.
async fn apply_action(State(db): State<Db>, ApiPath((id, action)): ApiPath<(Uuid, String)>) -> ApiResult {
    let target = match action.as_str() {
        "enable" => "enabled",
        "disable" => "disabled",
        "set_standby" => "standby",
        _ => return Err(ApiFailure::not_found("SIM card action")),
    };

    let mut store = db.write().await;
    let card = find_mut(&mut store, id)?;
    if card.status() == target {
        return Err(ApiFailure::invalid("/", format!("the SIM card is already {target}")));
    }
    card.set_status(target);

    let now = Utc::now();
    data(
        StatusCode::ACCEPTED,
        json!({
            "id": Uuid::new_v4(),
            "record_type": "sim_card_action",
            "sim_card_id": id,
            "action_type": action,
            "status": { "value": "in-progress" },
            "settings": null,
            "created_at": now,
            "updated_at": now,
        }),
    )
}

fn find(store: &Store, id: Uuid) -> Result<&SimCardRecord, ApiFailure> {
    store
        .sim_cards
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("SIM card"))
}

fn find_mut(store: &mut Store, id: Uuid) -> Result<&mut SimCardRecord, ApiFailure> {
    store
        .sim_cards
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("SIM card"))
}
