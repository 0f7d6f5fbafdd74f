//! Call control: dial, status, in-call commands and active-call listing.
//!
//! Active calls use cursor pagination; a cursor is the index of the next
//! record encoded as `c<index>`.

use std::collections::HashMap;

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

use crate::{data, parse_positive, ApiFailure, ApiPath, ApiResult, Db, DEFAULT_PAGE_SIZE};

pub const SEEDED_CONNECTION_ID: &str = "1494404757140276705";

#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub call_control_id: String,
    pub call_leg_id: String,
    pub call_session_id: String,
    pub is_alive: bool,
    pub record_type: &'static str,
    pub client_state: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub connection_id: String,
    #[serde(skip)]
    pub recording: bool,
}

impl CallRecord {
    fn new(connection_id: &str, client_state: Option<String>) -> Self {
        Self {
            call_control_id: format!("v3:{}", Uuid::new_v4().simple()),
            call_leg_id: Uuid::new_v4().to_string(),
            call_session_id: Uuid::new_v4().to_string(),
            is_alive: true,
            record_type: "call",
            client_state,
            start_time: Utc::now(),
            end_time: None,
            connection_id: connection_id.to_string(),
            recording: false,
        }
    }

    fn as_active(&self) -> Value {
        json!({
            "call_control_id": self.call_control_id,
            "call_leg_id": self.call_leg_id,
            "call_session_id": self.call_session_id,
            "call_duration": (Utc::now() - self.start_time).num_seconds().max(0),
            "client_state": self.client_state,
            "record_type": "call",
        })
    }
}

pub fn seed() -> Vec<CallRecord> {
    (0..3)
        .map(|_| CallRecord::new(SEEDED_CONNECTION_ID, None))
        .collect()
}

#[derive(Debug, Deserialize)]
struct DialInput {
    connection_id: String,
    to: String,
    from: String,
    client_state: Option<String>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/calls", post(dial))
        .route("/calls/{id}", get(retrieve_status))
        .route("/calls/{id}/actions/{action}", post(command))
        .route("/connections/{id}/active_calls", get(list_active))
}

async fn dial(State(db): State<Db>, payload: Result<Json<DialInput>, JsonRejection>) -> ApiResult {
    let Json(input) = payload?;
    if input.connection_id.is_empty() {
        return Err(ApiFailure::invalid("/connection_id", "connection_id is required"));
    }
    if !input.to.starts_with('+') && !input.to.starts_with("sip:") {
        return Err(ApiFailure::invalid("/to", "to must be an E.164 number or SIP URI"));
    }
    if input.from.is_empty() {
        return Err(ApiFailure::invalid("/from", "from is required"));
    }

    let call = CallRecord::new(&input.connection_id, input.client_state);
    db.write().await.calls.push(call.clone());
    tracing::debug!(call_control_id = %call.call_control_id, "call dialed");
    data(StatusCode::OK, call)
}

async fn retrieve_status(State(db): State<Db>, ApiPath(id): ApiPath<String>) -> ApiResult {
    let store = db.read().await;
    let call = store
        .calls
        .iter()
        .find(|c| c.call_control_id == id)
        .ok_or_else(|| ApiFailure::not_found("call"))?;
    data(StatusCode::OK, call)
}

async fn command(
    State(db): State<Db>,
    ApiPath((id, action)): ApiPath<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let mut store = db.write().await;

    let Some(index) = store.calls.iter().position(|c| c.call_control_id == id) else {
        return Err(ApiFailure::not_found("call"));
    };
    if !store.calls[index].is_alive {
        return Err(call_ended());
    }

    match action.as_str() {
        "answer" => {}
        "hangup" => {
            let call = &mut store.calls[index];
            call.is_alive = false;
            call.end_time = Some(Utc::now());
        }
        "speak" => {
            require_str(&body, "payload")?;
            require_str(&body, "voice")?;
        }
        "transfer" => {
            require_str(&body, "to")?;
        }
        "bridge" => {
            let other = require_str(&body, "call_control_id")?;
            let alive = store
                .calls
                .iter()
                .any(|c| c.call_control_id == other && c.is_alive);
            if !alive {
                return Err(ApiFailure::invalid(
                    "/call_control_id",
                    "the call to bridge with is not active",
                ));
            }
        }
        "record_start" => {
            require_str(&body, "format")?;
            require_str(&body, "channels")?;
            store.calls[index].recording = true;
        }
        "record_stop" => {
            if !store.calls[index].recording {
                return Err(ApiFailure::invalid("/", "the call is not being recorded"));
            }
            store.calls[index].recording = false;
        }
        _ => return Err(ApiFailure::not_found("call command")),
    }

    if let Some(state) = body.get("client_state").and_then(Value::as_str) {
        store.calls[index].client_state = Some(state.to_string());
    }
    tracing::debug!(call_control_id = %id, action = %action, "call command");
    data(StatusCode::OK, json!({ "result": "ok" }))
}

async fn list_active(
    State(db): State<Db>,
    ApiPath(connection_id): ApiPath<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let limit = parse_positive(&query, "page[limit]", DEFAULT_PAGE_SIZE)?;
    // Cursors are list positions: `after` starts a page there, `before`
    // ends one there.
    let (start, take) = match (query.get("page[after]"), query.get("page[before]")) {
        (Some(cursor), _) => (decode_cursor("page[after]", cursor)?, limit),
        (None, Some(cursor)) => {
            let end = decode_cursor("page[before]", cursor)?;
            let start = end.saturating_sub(limit);
            (start, end - start)
        }
        (None, None) => (0, limit),
    };

    let store = db.read().await;
    let active: Vec<&CallRecord> = store
        .calls
        .iter()
        .filter(|c| c.is_alive && c.connection_id == connection_id)
        .collect();
    let total = active.len();
    let page: Vec<Value> = active
        .iter()
        .skip(start)
        .take(take)
        .map(|c| c.as_active())
        .collect();
    let end = start + page.len();

    let after = (end < total).then(|| format!("c{end}"));
    let before = (start > 0).then(|| format!("c{start}"));
    let next = after.as_ref().map(|cursor| {
        format!("/v2/connections/{connection_id}/active_calls?page[after]={cursor}&page[limit]={limit}")
    });
    let previous = before.as_ref().map(|cursor| {
        format!("/v2/connections/{connection_id}/active_calls?page[before]={cursor}&page[limit]={limit}")
    });

    Ok(Json(json!({
        "data": page,
        "meta": {
            "cursors": { "after": after, "before": before },
            "next": next,
            "previous": previous,
            "total_items": total,
        }
    }))
    .into_response())
}

fn decode_cursor(key: &str, cursor: &str) -> Result<usize, ApiFailure> {
    cursor
        .strip_prefix('c')
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| ApiFailure::invalid(key, "invalid cursor"))
}

fn require_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, ApiFailure> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiFailure::invalid(&format!("/{field}"), format!("{field} is required")))
}

fn call_ended() -> ApiFailure {
    ApiFailure::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "90018",
        "Call has already ended",
        "This call is no longer active and can't receive commands.",
    )
}
