//! Wireless SIM cards and their asynchronous state actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiRequest, TelnyxClient};
use crate::enums::{api_enum, SortOrder};
use crate::error::ApiError;
use crate::pagination::{Page, PageParams};

api_enum! {
    pub enum SimCardStatus {
        Registering => "registering",
        Enabling => "enabling",
        Enabled => "enabled",
        Disabling => "disabling",
        Disabled => "disabled",
        DataLimitExceeded => "data_limit_exceeded",
        SettingStandby => "setting_standby",
        Standby => "standby",
        UnauthorizedImei => "unauthorized_imei",
    }
}

api_enum! {
    pub enum SimCardType {
        Physical => "physical",
        Esim => "esim",
    }
}

api_enum! {
    pub enum SimCardActionType {
        Enable => "enable",
        Disable => "disable",
        SetStandby => "set_standby",
        RemovePublicIp => "remove_public_ip",
        SetPublicIp => "set_public_ip",
    }
}

api_enum! {
    pub enum SimCardActionStatus {
        InProgress => "in-progress",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimCardFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iccid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<SimCardStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sim_card_group_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSimCardsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SimCardFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_sim_card_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveSimCardParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_sim_card_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pin_puk_codes: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSimCardParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sim_card_group_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_imeis: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limit: Option<DataAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAmount {
    pub amount: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimCardStatusInfo {
    pub value: SimCardStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimCard {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    pub iccid: String,
    #[serde(default)]
    pub imsi: Option<String>,
    #[serde(default)]
    pub msisdn: Option<String>,
    pub status: SimCardStatusInfo,
    #[serde(rename = "type", default)]
    pub sim_type: Option<SimCardType>,
    #[serde(default)]
    pub sim_card_group_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authorized_imeis: Vec<String>,
    #[serde(default)]
    pub data_limit: Option<DataAmount>,
    #[serde(default)]
    pub current_billing_period_consumed_data: Option<DataAmount>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimCardActionStatusInfo {
    pub value: SimCardActionStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// An asynchronous state change; poll the SIM card to observe completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimCardAction {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    pub sim_card_id: Uuid,
    pub action_type: SimCardActionType,
    pub status: SimCardActionStatusInfo,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct SimCards<'c> {
    client: &'c TelnyxClient,
}

impl<'c> SimCards<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_list(
        &self,
        params: &ListSimCardsParams,
    ) -> Result<ApiRequest<Page<SimCard>>, ApiError> {
        self.client.list("/sim_cards", params)
    }

    pub fn build_retrieve(
        &self,
        id: Uuid,
        params: &RetrieveSimCardParams,
    ) -> Result<ApiRequest<SimCard>, ApiError> {
        self.client.get_with_query(&format!("/sim_cards/{id}"), params)
    }

    pub fn build_update(
        &self,
        id: Uuid,
        params: &UpdateSimCardParams,
    ) -> Result<ApiRequest<SimCard>, ApiError> {
        self.client.patch(&format!("/sim_cards/{id}"), params)
    }

    /// Deletion answers with the removed card.
    pub fn build_delete(&self, id: Uuid) -> ApiRequest<SimCard> {
        self.client.delete(&format!("/sim_cards/{id}"))
    }

    pub fn build_enable(&self, id: Uuid) -> ApiRequest<SimCardAction> {
        self.action(id, SimCardActionType::Enable)
    }

    pub fn build_disable(&self, id: Uuid) -> ApiRequest<SimCardAction> {
        self.action(id, SimCardActionType::Disable)
    }

    pub fn build_set_standby(&self, id: Uuid) -> ApiRequest<SimCardAction> {
        self.action(id, SimCardActionType::SetStandby)
    }

    fn action(&self, id: Uuid, action: SimCardActionType) -> ApiRequest<SimCardAction> {
        self.client
            .post_empty(&format!("/sim_cards/{id}/actions/{action}"))
    }
}
