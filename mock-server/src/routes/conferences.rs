use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{data, flag, page_of, ApiFailure, ApiPath, ApiResult, Db, Store};

#[derive(Debug, Clone, Serialize)]
pub struct ConferenceRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub call_control_id: String,
    pub call_leg_id: String,
    pub conference: ConferenceRef,
    pub status: &'static str,
    pub muted: bool,
    pub on_hold: bool,
    pub whispering: bool,
    pub end_conference_on_exit: bool,
    pub soft_end_conference_on_exit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConferenceRecord {
    pub id: Uuid,
    pub name: String,
    pub record_type: &'static str,
    pub status: &'static str,
    pub connection_id: String,
    pub region: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub participants: Vec<ParticipantRecord>,
}

impl ConferenceRecord {
    fn add_participant(&mut self, call_control_id: String, call_leg_id: String, mute: bool, hold: bool) {
        let now = Utc::now();
        self.participants.push(ParticipantRecord {
            id: Uuid::new_v4(),
            record_type: "participant",
            call_control_id,
            call_leg_id,
            conference: ConferenceRef {
                id: self.id,
                name: self.name.clone(),
            },
            status: "joined",
            muted: mute,
            on_hold: hold,
            whispering: false,
            end_conference_on_exit: false,
            soft_end_conference_on_exit: false,
            created_at: now,
            updated_at: now,
        });
        self.updated_at = now;
    }
}

#[derive(Debug, Deserialize)]
struct CreateInput {
    call_control_id: String,
    name: String,
    duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JoinInput {
    call_control_id: String,
    #[serde(default)]
    mute: bool,
    #[serde(default)]
    hold: bool,
}

#[derive(Debug, Deserialize)]
struct LeaveInput {
    call_control_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ParticipantsInput {
    #[serde(default)]
    call_control_ids: Vec<String>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/conferences", post(create).get(list))
        .route("/conferences/{id}", get(retrieve))
        .route("/conferences/{id}/participants", get(list_participants))
        .route("/conferences/{id}/actions/join", post(join))
        .route("/conferences/{id}/actions/leave", post(leave))
        .route("/conferences/{id}/actions/{action}", post(participants_command))
}

async fn create(State(db): State<Db>, payload: Result<Json<CreateInput>, JsonRejection>) -> ApiResult {
    let Json(input) = payload?;
    if input.name.trim().is_empty() {
        return Err(ApiFailure::invalid("/name", "name is required"));
    }

    let mut store = db.write().await;
    let call = live_call(&store, &input.call_control_id)?;
    let (leg, connection_id) = (call.call_leg_id.clone(), call.connection_id.clone());

    let now = Utc::now();
    let mut conference = ConferenceRecord {
        id: Uuid::new_v4(),
        name: input.name,
        record_type: "conference",
        status: "in_progress",
        connection_id,
        region: "ashburn-va",
        created_at: now,
        updated_at: now,
        expires_at: now + chrono::Duration::minutes(input.duration_minutes.unwrap_or(240)),
        participants: Vec::new(),
    };
    conference.add_participant(input.call_control_id, leg, false, false);
    store.conferences.push(conference.clone());
    tracing::debug!(id = %conference.id, "conference created");
    data(StatusCode::OK, conference)
}

async fn list(State(db): State<Db>, Query(query): Query<HashMap<String, String>>) -> ApiResult {
    let store = db.read().await;
    let name = query.get("filter[name]");
    let status = query.get("filter[status]");
    let items: Vec<&ConferenceRecord> = store
        .conferences
        .iter()
        .filter(|c| name.map_or(true, |n| c.name == *n))
        .filter(|c| status.map_or(true, |s| c.status == s.as_str()))
        .collect();
    page_of(items, &query)
}

async fn retrieve(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let store = db.read().await;
    data(StatusCode::OK, find(&store, id)?)
}

async fn list_participants(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    let store = db.read().await;
    let conference = find(&store, id)?;
    let muted = flag(&query, "filter[muted]");
    let on_hold = flag(&query, "filter[on_hold]");
    let whispering = flag(&query, "filter[whispering]");
    let items: Vec<&ParticipantRecord> = conference
        .participants
        .iter()
        .filter(|p| p.status != "left")
        .filter(|p| muted.map_or(true, |m| p.muted == m))
        .filter(|p| on_hold.map_or(true, |h| p.on_hold == h))
        .filter(|p| whispering.map_or(true, |w| p.whispering == w))
        .collect();
    page_of(items, &query)
}

async fn join(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<JoinInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    let leg = live_call(&store, &input.call_control_id)?.call_leg_id.clone();
    let conference = find_mut(&mut store, id)?;
    if conference.status == "completed" {
        return Err(ApiFailure::invalid("/", "the conference has ended"));
    }
    let already = conference
        .participants
        .iter()
        .any(|p| p.call_control_id == input.call_control_id && p.status != "left");
    if already {
        return Err(ApiFailure::invalid("/call_control_id", "the call is already in the conference"));
    }
    conference.add_participant(input.call_control_id, leg, input.mute, input.hold);
    ok()
}

async fn leave(
    State(db): State<Db>,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<LeaveInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let mut store = db.write().await;
    let conference = find_mut(&mut store, id)?;
    let participant = conference
        .participants
        .iter_mut()
        .find(|p| p.call_control_id == input.call_control_id && p.status != "left")
        .ok_or_else(|| ApiFailure::invalid("/call_control_id", "the call is not in the conference"))?;
    participant.status = "left";
    participant.updated_at = Utc::now();
    ok()
}

/// mute, unmute, hold and unhold. An empty `call_control_ids` targets every
/// participant.
async fn participants_command(
    State(db): State<Db>,
    ApiPath((id, action)): ApiPath<(Uuid, String)>,
    payload: Result<Json<ParticipantsInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let apply: fn(&mut ParticipantRecord) = match action.as_str() {
        "mute" => |p: &mut ParticipantRecord| p.muted = true,
        "unmute" => |p: &mut ParticipantRecord| p.muted = false,
        "hold" => |p: &mut ParticipantRecord| p.on_hold = true,
        "unhold" => |p: &mut ParticipantRecord| p.on_hold = false,
        _ => return Err(ApiFailure::not_found("conference command")),
    };

    let mut store = db.write().await;
    let conference = find_mut(&mut store, id)?;
    let now = Utc::now();
    for participant in conference.participants.iter_mut().filter(|p| {
        p.status != "left"
            && (input.call_control_ids.is_empty() || input.call_control_ids.contains(&p.call_control_id))
    }) {
        apply(participant);
        participant.updated_at = now;
    }
    ok()
}

fn ok() -> ApiResult {
    data(StatusCode::OK, json!({ "result": "ok" }))
}

fn find(store: &Store, id: Uuid) -> Result<&ConferenceRecord, ApiFailure> {
    store
        .conferences
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("conference"))
}

fn find_mut(store: &mut Store, id: Uuid) -> Result<&mut ConferenceRecord, ApiFailure> {
    store
        .conferences
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ApiFailure::not_found("conference"))
}

fn live_call<'s>(store: &'s Store, call_control_id: &str) -> Result<&'s super::calls::CallRecord, ApiFailure> {
    store
        .calls
        .iter()
        .find(|c| c.call_control_id == call_control_id && c.is_alive)
        .ok_or_else(|| ApiFailure::invalid("/call_control_id", "the call is not active"))
}
