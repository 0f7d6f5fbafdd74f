//! Call control: dial, command live calls, list active calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{segment, ApiRequest, TelnyxClient};
use crate::enums::api_enum;
use crate::error::ApiError;
use crate::pagination::{CursorPage, CursorParams};
use crate::resources::ActionResult;

api_enum! {
    pub enum AnsweringMachineDetection {
        Premium => "premium",
        Detect => "detect",
        DetectBeep => "detect_beep",
        DetectWords => "detect_words",
        Greeting => "greeting_end",
        Disabled => "disabled",
    }
}

api_enum! {
    pub enum WebhookMethod {
        Post => "POST",
        Get => "GET",
    }
}

api_enum! {
    pub enum SpeakPayloadType {
        Text => "text",
        Ssml => "ssml",
    }
}

api_enum! {
    pub enum RecordingFormat {
        Wav => "wav",
        Mp3 => "mp3",
    }
}

api_enum! {
    pub enum RecordingChannels {
        Single => "single",
        Dual => "dual",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSipHeader {
    pub name: String,
    pub value: String,
}

/// Body of `POST /calls`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialParams {
    pub connection_id: String,
    pub to: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answering_machine_detection: Option<AnsweringMachineDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url_method: Option<WebhookMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub custom_headers: Vec<CustomSipHeader>,
}

/// `client_state` / `command_id` pair accepted by most call commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url_method: Option<WebhookMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakParams {
    pub payload: String,
    pub voice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_type: Option<SpeakPayloadType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferParams {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answering_machine_detection: Option<AnsweringMachineDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeParams {
    /// The other leg to bridge with.
    pub call_control_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStartParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<RecordingFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<RecordingChannels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_beep: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

/// A call leg as returned by dial and status lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub call_control_id: String,
    pub call_leg_id: String,
    pub call_session_id: String,
    #[serde(default)]
    pub is_alive: bool,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub call_duration: Option<u64>,
    #[serde(default)]
    pub client_state: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCall {
    pub call_control_id: String,
    pub call_leg_id: String,
    pub call_session_id: String,
    #[serde(default)]
    pub call_duration: Option<u64>,
    #[serde(default)]
    pub client_state: Option<String>,
    #[serde(default)]
    pub record_type: Option<String>,
}

#[derive(Serialize)]
struct ActiveCallsQuery<'a> {
    page: &'a CursorParams,
}

pub struct Calls<'c> {
    client: &'c TelnyxClient,
}

impl<'c> Calls<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_dial(&self, params: &DialParams) -> Result<ApiRequest<Call>, ApiError> {
        self.client.post("/calls", params)
    }

    pub fn build_retrieve_status(&self, call_control_id: &str) -> ApiRequest<Call> {
        self.client.get(&format!("/calls/{}", segment(call_control_id)))
    }

    pub fn build_answer(
        &self,
        call_control_id: &str,
        params: &AnswerParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "answer", params)
    }

    pub fn build_hangup(
        &self,
        call_control_id: &str,
        params: &CommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "hangup", params)
    }

    pub fn build_speak(
        &self,
        call_control_id: &str,
        params: &SpeakParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "speak", params)
    }

    pub fn build_transfer(
        &self,
        call_control_id: &str,
        params: &TransferParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "transfer", params)
    }

    pub fn build_bridge(
        &self,
        call_control_id: &str,
        params: &BridgeParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "bridge", params)
    }

    pub fn build_record_start(
        &self,
        call_control_id: &str,
        params: &RecordStartParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "record_start", params)
    }

    pub fn build_record_stop(
        &self,
        call_control_id: &str,
        params: &CommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(call_control_id, "record_stop", params)
    }

    /// Active calls on a connection, cursor paginated.
    pub fn build_list_active(
        &self,
        connection_id: &str,
        page: &CursorParams,
    ) -> Result<ApiRequest<CursorPage<ActiveCall>>, ApiError> {
        self.client.list(
            &format!("/connections/{}/active_calls", segment(connection_id)),
            &ActiveCallsQuery { page },
        )
    }

    fn action<B: Serialize>(
        &self,
        call_control_id: &str,
        action: &str,
        body: &B,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.client.post(
            &format!("/calls/{}/actions/{action}", segment(call_control_id)),
            body,
        )
    }
}
