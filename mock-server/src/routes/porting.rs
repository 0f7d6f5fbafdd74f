//! Porting orders. Creation splits the submitted numbers into one draft
//! order per area code, mirroring the per-carrier split of the real service.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{data, flag, merge, page_of, ApiFailure, ApiPath, ApiResult, Db, Store};

/// Fields a PATCH may touch.
const EDITABLE: [&str; 6] = [
    "customer_reference",
    "end_user",
    "misc",
    "phone_number_configuration",
    "activation_settings",
    "webhook_url",
];

#[derive(Debug, Clone, Serialize)]
pub struct PortingOrderRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub status: Value,
    pub customer_reference: Option<String>,
    pub support_key: Option<String>,
    pub porting_phone_numbers_count: usize,
    pub phone_numbers: Vec<Value>,
    pub old_service_provider_ocn: String,
    pub activation_settings: Value,
    pub end_user: Value,
    pub misc: Value,
    pub phone_number_configuration: Value,
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortingOrderRecord {
    fn new(numbers: Vec<String>, customer_reference: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            record_type: "porting_order",
            status: json!({ "value": "draft", "details": [] }),
            customer_reference,
            support_key: None,
            porting_phone_numbers_count: numbers.len(),
            phone_numbers: numbers
                .into_iter()
                .map(|n| json!({ "phone_number": n, "activation_status": "New", "portability_status": "pending" }))
                .collect(),
            old_service_provider_ocn: "Unreal Communications".into(),
            activation_settings: json!({ "fast_port_eligible": true }),
            end_user: json!({ "admin": {}, "location": {} }),
            misc: json!({ "type": "full", "remaining_numbers_action": null }),
            phone_number_configuration: json!({ "tags": [] }),
            webhook_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn status(&self) -> &str {
        self.status["value"].as_str().unwrap_or_default()
    }

    fn set_status(&mut self, value: &str) {
        self.status = json!({ "value": value, "details": [] });
        self.updated_at = Utc::now();
    }

    /// Serialized form, without `phone_numbers` unless asked for.
    fn render(&self, include_phone_numbers: bool) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if !include_phone_numbers {
            if let Some(object) = value.as_object_mut() {
                object.remove("phone_numbers");
            }
        }
        value
    }

    fn matches(&self, query: &HashMap<String, String>) -> bool {
        let status_ok = query
            .get("filter[status]")
            .map_or(true, |s| self.status() == s);
        let reference_ok = query
            .get("filter[customer_reference]")
            .map_or(true, |r| self.customer_reference.as_deref() == Some(r.as_str()));
        let number_ok = query
            .get("filter[phone_numbers][phone_number][contains]")
            .map_or(true, |needle| {
                self.phone_numbers
                    .iter()
                    .filter_map(|n| n["phone_number"].as_str())
                    .any(|n| n.contains(needle.as_str()))
            });
        let type_ok = query
            .get("filter[misc][type]")
            .map_or(true, |t| self.misc["type"].as_str() == Some(t.as_str()));
        let fast_port_ok = flag(query, "filter[activation_settings][fast_port_eligible]")
            .map_or(true, |f| self.activation_settings["fast_port_eligible"].as_bool() == Some(f));
        status_ok && reference_ok && number_ok && type_ok && fast_port_ok
    }
}

#[derive(Debug, Deserialize)]
struct CreateInput {
    phone_numbers: Vec<String>,
    customer_reference: Option<String>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/porting_orders", post(create).get(list))
        .route(
            "/porting_orders/{id}",
            get(retrieve).patch(update).delete(remove),
        )
        .route("/porting_orders/{id}/actions/confirm", post(confirm))
        .route("/porting_orders/{id}/actions/cancel", post(cancel))
}

async fn create(State(db): State<Db>, payload: Result<Json<CreateInput>, JsonRejection>) -> ApiResult {
    let Json(input) = payload?;
    if input.phone_numbers.is_empty() {
        return Err(ApiFailure::invalid("/phone_numbers", "at least one phone number is required"));
    }
    if let Some(bad) = input.phone_numbers.iter().find(|n| !n.starts_with('+') || n.len() < 8) {
        return Err(ApiFailure::invalid("/phone_numbers", format!("{bad} is not an E.164 number")));
    }

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for number in input.phone_numbers {
        let prefix: String = number.chars().take(5).collect();
        groups.entry(prefix).or_default().push(number);
    }

    let orders: Vec<PortingOrderRecord> = groups
        .into_values()
        .map(|numbers| PortingOrderRecord::new(numbers, input.customer_reference.clone()))
        .collect();
    let rendered: Vec<Value> = orders.iter().map(|o| o.render(true)).collect();
    db.write().await.porting_orders.extend(orders);
    data(StatusCode::CREATED, rendered)
}

async fn list(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> ApiResult {
    let include = flag(&query, "include_phone_numbers").unwrap_or(true);
    let store = db.read().await;
    let mut items: Vec<&PortingOrderRecord> = store
        .porting_orders
        .iter()
        .filter(|o| o.matches(&query))
        .collect();
    match query.get("sort[by]").map(String::as_str) {
        Some("-created_at") => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        Some("created_at") => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        Some("-updated_at") => items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        Some("updated_at") => items.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
        Some(other) => {
            return Err(ApiFailure::invalid("sort[by]", format!("unsupported sort {other}")));
        }
        None => {}
    }
    let rendered: Vec<Value> = items.iter().map(|o| o.render(include)).collect();
    page_of(rendered, &query)
}

async fn retrieve(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let include = flag(&query, "include_phone_numbers").unwrap_or(true);
    let store = db.read().await;
    let order = find(&store, id)?;
    data(StatusCode::OK, order.render(include))
}

async fn update(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(patch) = payload?;
    let Value::Object(patch) = patch else {
        return Err(ApiFailure::invalid("/", "body must be an object"));
    };
    if let Some(key) = patch.keys().find(|k| !EDITABLE.contains(&k.as_str())) {
        return Err(ApiFailure::invalid(&format!("/{key}"), format!("{key} cannot be changed")));
    }

    let mut store = db.write().await;
    let order = find_mut(&mut store, id)?;
    if !matches!(order.status(), "draft" | "exception") {
        return Err(ApiFailure::invalid("/", "only draft or exception orders can be edited"));
    }

    let mut current = serde_json::to_value(&*order).unwrap_or(Value::Null);
    merge(&mut current, Value::Object(patch));
    order.customer_reference = current["customer_reference"].as_str().map(str::to_string);
    order.webhook_url = current["webhook_url"].as_str().map(str::to_string);
    order.end_user = current["end_user"].take();
    order.misc = current["misc"].take();
    order.phone_number_configuration = current["phone_number_configuration"].take();
    order.activation_settings = current["activation_settings"].take();
    order.updated_at = Utc::now();
    data(StatusCode::OK, order.render(true))
}

async fn remove(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let order = find(&store, id)?;
    if order.status() != "draft" {
        return Err(ApiFailure::invalid("/", "only draft orders can be deleted"));
    }
    store.porting_orders.retain(|o| o.id != id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Submits a draft. The end user's entity name is the one requirement
/// enforced here.
async fn confirm(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let order = find_mut(&mut store, id)?;
    if order.status() != "draft" {
        return Err(ApiFailure::invalid("/", "only draft orders can be confirmed"));
    }
    let has_entity = order.end_user["admin"]["entity_name"]
        .as_str()
        .is_some_and(|name| !name.is_empty());
    if !has_entity {
        return Err(ApiFailure::invalid(
            "/end_user/admin/entity_name",
            "entity_name is required before confirming",
        ));
    }
    order.set_status("in-process");
    order.support_key = Some(format!("sr_{}", &order.id.simple().to_string()[..6]));
    data(StatusCode::OK, order.render(true))
}

async fn cancel(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let mut store = db.write().await;
    let order = find_mut(&mut store, id)?;
    if matches!(order.status(), "ported" | "cancelled") {
        return Err(ApiFailure::invalid("/", "the order can no longer be cancelled"));
    }
    order.set_status("cancelled");
    data(StatusCode::OK, order.render(true))
}

fn find(store: &Store, id: Uuid) -> Result<&PortingOrderRecord, ApiFailure> {
    store
        .porting_orders
        .iter()
        .find(|o| o.id == id)
        .ok_or_else(|| ApiFailure::not_found("porting order"))
}

fn find_mut(store: &mut Store, id: Uuid) -> Result<&mut PortingOrderRecord, ApiFailure> {
    store
        .porting_orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| ApiFailure::not_found("porting order"))
}
