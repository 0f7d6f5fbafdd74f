//! Messaging: send SMS/MMS and retrieve message records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiRequest, TelnyxClient};
use crate::enums::api_enum;
use crate::error::{ApiError, ErrorObject};

api_enum! {
    pub enum MessageType {
        Sms => "SMS",
        Mms => "MMS",
    }
}

api_enum! {
    pub enum MessageDirection {
        Inbound => "inbound",
        Outbound => "outbound",
    }
}

api_enum! {
    /// Per-recipient delivery state.
    pub enum DeliveryStatus {
        Queued => "queued",
        Sending => "sending",
        Sent => "sent",
        Delivered => "delivered",
        SendingFailed => "sending_failed",
        DeliveryFailed => "delivery_failed",
        DeliveryUnconfirmed => "delivery_unconfirmed",
        Expired => "expired",
        Received => "received",
    }
}

/// Body of `POST /messages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageParams {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_failover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_profile_webhooks: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_detect: Option<bool>,
}

impl SendMessageParams {
    pub fn sms(from: impl Into<String>, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Body of `POST /messages/number_pool`: the sender is picked from the
/// profile's number pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberPoolMessageParams {
    pub messaging_profile_id: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_profile_webhooks: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEndpoint {
    pub phone_number: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub line_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecipient {
    pub phone_number: String,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub line_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub hash_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub direction: Option<MessageDirection>,
    #[serde(rename = "type", default)]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub messaging_profile_id: Option<String>,
    #[serde(default)]
    pub from: Option<MessageEndpoint>,
    #[serde(default)]
    pub to: Vec<MessageRecipient>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub parts: Option<u32>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub cost: Option<Cost>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

pub struct Messages<'c> {
    client: &'c TelnyxClient,
}

impl<'c> Messages<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_send(&self, params: &SendMessageParams) -> Result<ApiRequest<Message>, ApiError> {
        self.client.post("/messages", params)
    }

    pub fn build_send_with_number_pool(
        &self,
        params: &NumberPoolMessageParams,
    ) -> Result<ApiRequest<Message>, ApiError> {
        self.client.post("/messages/number_pool", params)
    }

    pub fn build_retrieve(&self, id: Uuid) -> ApiRequest<Message> {
        self.client.get(&format!("/messages/{id}"))
    }
}
