//! Conferences and their participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiRequest, TelnyxClient};
use crate::enums::api_enum;
use crate::error::ApiError;
use crate::pagination::{Page, PageParams};
use crate::resources::ActionResult;

api_enum! {
    pub enum ConferenceStatus {
        Init => "init",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

api_enum! {
    /// When the conference plays a beep as participants come and go.
    pub enum BeepEnabled {
        Always => "always",
        Never => "never",
        OnEnter => "on_enter",
        OnExit => "on_exit",
    }
}

api_enum! {
    pub enum ParticipantStatus {
        Joining => "joining",
        Joined => "joined",
        Left => "left",
    }
}

/// Body of `POST /conferences`. The conference is created around an
/// existing call leg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConferenceParams {
    pub call_control_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_enabled: Option<BeepEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comfort_noise: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_conference_on_create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConferenceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConferenceStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListConferencesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ConferenceFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_hold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whispering: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParticipantsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ParticipantFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinConferenceParams {
    pub call_control_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_enabled: Option<BeepEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_conference_on_enter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_conference_on_exit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveConferenceParams {
    pub call_control_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beep_enabled: Option<BeepEnabled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
}

/// Targets for mute/unmute/hold/unhold. An empty list applies the command
/// to every participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantsCommandParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_control_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conference {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub status: Option<ConferenceStatus>,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub end_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceRef {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub call_control_id: String,
    pub call_leg_id: String,
    #[serde(default)]
    pub conference: Option<ConferenceRef>,
    #[serde(default)]
    pub status: Option<ParticipantStatus>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub on_hold: bool,
    #[serde(default)]
    pub whispering: bool,
    #[serde(default)]
    pub end_conference_on_exit: bool,
    #[serde(default)]
    pub soft_end_conference_on_exit: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct Conferences<'c> {
    client: &'c TelnyxClient,
}

impl<'c> Conferences<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_create(
        &self,
        params: &CreateConferenceParams,
    ) -> Result<ApiRequest<Conference>, ApiError> {
        self.client.post("/conferences", params)
    }

    pub fn build_list(
        &self,
        params: &ListConferencesParams,
    ) -> Result<ApiRequest<Page<Conference>>, ApiError> {
        self.client.list("/conferences", params)
    }

    pub fn build_retrieve(&self, id: Uuid) -> ApiRequest<Conference> {
        self.client.get(&format!("/conferences/{id}"))
    }

    pub fn build_list_participants(
        &self,
        id: Uuid,
        params: &ListParticipantsParams,
    ) -> Result<ApiRequest<Page<Participant>>, ApiError> {
        self.client
            .list(&format!("/conferences/{id}/participants"), params)
    }

    pub fn build_join(
        &self,
        id: Uuid,
        params: &JoinConferenceParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "join", params)
    }

    pub fn build_leave(
        &self,
        id: Uuid,
        params: &LeaveConferenceParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "leave", params)
    }

    pub fn build_mute(
        &self,
        id: Uuid,
        params: &ParticipantsCommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "mute", params)
    }

    pub fn build_unmute(
        &self,
        id: Uuid,
        params: &ParticipantsCommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "unmute", params)
    }

    pub fn build_hold(
        &self,
        id: Uuid,
        params: &ParticipantsCommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "hold", params)
    }

    pub fn build_unhold(
        &self,
        id: Uuid,
        params: &ParticipantsCommandParams,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.action(id, "unhold", params)
    }

    fn action<B: Serialize>(
        &self,
        id: Uuid,
        action: &str,
        body: &B,
    ) -> Result<ApiRequest<ActionResult>, ApiError> {
        self.client
            .post(&format!("/conferences/{id}/actions/{action}"), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse};

    fn client() -> TelnyxClient {
        TelnyxClient::new("http://localhost:3000/v2", "KEY")
    }

    #[test]
    fn build_list_flattens_filter_and_page() {
        let params = ListConferencesParams {
            filter: Some(ConferenceFilter {
                name: Some("standup".into()),
                status: Some(ConferenceStatus::InProgress),
            }),
            page: Some(PageParams::new(2, 25)),
        };
        let req = client().conferences().build_list(&params).unwrap();
        assert_eq!(req.http.method, HttpMethod::Get);
        assert_eq!(req.http.path, "http://localhost:3000/v2/conferences");
        assert_eq!(
            req.http.url(),
            "http://localhost:3000/v2/conferences?filter%5Bname%5D=standup&filter%5Bstatus%5D=in_progress&page%5Bnumber%5D=2&page%5Bsize%5D=25"
        );
    }

    #[test]
    fn build_list_without_params_has_empty_query() {
        let req = client()
            .conferences()
            .build_list(&ListConferencesParams::default())
            .unwrap();
        assert!(req.http.query.is_empty());
    }

    #[test]
    fn mute_all_sends_empty_object() {
        let req = client()
            .conferences()
            .build_mute(Uuid::nil(), &ParticipantsCommandParams::default())
            .unwrap();
        assert_eq!(
            req.http.path,
            "http://localhost:3000/v2/conferences/00000000-0000-0000-0000-000000000000/actions/mute"
        );
        assert_eq!(req.http.body.as_deref(), Some("{}"));
    }

    #[test]
    fn participants_filter_booleans() {
        let params = ListParticipantsParams {
            filter: Some(ParticipantFilter {
                muted: Some(true),
                ..Default::default()
            }),
            page: None,
        };
        let req = client()
            .conferences()
            .build_list_participants(Uuid::nil(), &params)
            .unwrap();
        assert_eq!(req.http.query_param("filter[muted]"), Some("true"));
        assert!(req.http.path.ends_with("/participants"));
    }

    #[test]
    fn parse_conference() {
        let req = client().conferences().build_retrieve(Uuid::nil());
        let body = r#"{"data":{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","name":"All hands","record_type":"conference","status":"completed","end_reason":"all_left","created_at":"2019-01-23T18:10:02.574Z","expires_at":"2019-01-23T18:10:02.574Z"}}"#;
        let conference = req
            .parse(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            })
            .unwrap();
        assert_eq!(conference.name, "All hands");
        assert_eq!(conference.status, Some(ConferenceStatus::Completed));
        assert_eq!(conference.end_reason.as_deref(), Some("all_left"));
    }
}
