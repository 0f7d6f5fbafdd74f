use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{data, ApiFailure, ApiPath, ApiResult, Db};

/// Sender used for number-pool messages.
pub const POOL_NUMBER: &str = "+18445550100";

#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Media {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub record_type: &'static str,
    pub direction: &'static str,
    #[serde(rename = "type")]
    pub message_type: String,
    pub messaging_profile_id: Option<String>,
    pub from: Endpoint,
    pub to: Vec<Endpoint>,
    pub text: Option<String>,
    pub subject: Option<String>,
    pub media: Vec<Media>,
    pub parts: u32,
    pub encoding: &'static str,
    pub tags: Vec<String>,
    pub errors: Vec<serde_json::Value>,
    pub sent_at: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SendInput {
    pub from: Option<String>,
    pub to: String,
    pub text: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub messaging_profile_id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
}

pub fn router() -> Router<Db> {
    Router::new()
        .route("/messages", post(send))
        .route("/messages/number_pool", post(send_with_number_pool))
        .route("/messages/{id}", get(retrieve))
}

async fn send(State(db): State<Db>, payload: Result<Json<SendInput>, JsonRejection>) -> ApiResult {
    let Json(input) = payload?;
    let from = input
        .from
        .clone()
        .ok_or_else(|| ApiFailure::invalid("/from", "from is required"))?;
    queue(&db, from, input).await
}

async fn send_with_number_pool(
    State(db): State<Db>,
    payload: Result<Json<SendInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    if input.messaging_profile_id.as_deref().map_or(true, str::is_empty) {
        return Err(ApiFailure::invalid(
            "/messaging_profile_id",
            "messaging_profile_id is required",
        ));
    }
    queue(&db, POOL_NUMBER.to_string(), input).await
}

async fn retrieve(State(db): State<Db>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let store = db.read().await;
    let message = store
        .messages
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| ApiFailure::not_found("message"))?;
    data(StatusCode::OK, message)
}

async fn queue(db: &Db, from: String, input: SendInput) -> ApiResult {
    if !input.to.starts_with('+') {
        return Err(ApiFailure::invalid("/to", "to must be an E.164 number"));
    }
    if input.text.as_deref().map_or(true, str::is_empty) && input.media_urls.is_empty() {
        return Err(ApiFailure::invalid("/text", "text or media_urls is required"));
    }

    let message_type = input.message_type.unwrap_or_else(|| {
        if input.media_urls.is_empty() { "SMS" } else { "MMS" }.to_string()
    });
    let parts = input
        .text
        .as_deref()
        .map_or(1, |text| text.chars().count().div_ceil(160).max(1) as u32);
    let now = Utc::now();
    let record = MessageRecord {
        id: Uuid::new_v4(),
        record_type: "message",
        direction: "outbound",
        message_type,
        messaging_profile_id: input.messaging_profile_id,
        from: Endpoint {
            phone_number: from,
            status: None,
        },
        to: vec![Endpoint {
            phone_number: input.to,
            status: Some("queued".into()),
        }],
        text: input.text,
        subject: input.subject,
        media: input.media_urls.into_iter().map(|url| Media { url }).collect(),
        parts,
        encoding: "GSM-7",
        tags: Vec::new(),
        errors: Vec::new(),
        sent_at: None,
        valid_until: now + chrono::Duration::hours(4),
    };

    db.write().await.messages.push(record.clone());
    tracing::debug!(id = %record.id, "message queued");
    data(StatusCode::OK, record)
}
