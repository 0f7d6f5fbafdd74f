//! Number porting orders.
//!
//! Creating an order for a set of numbers may split them into several
//! orders (one per losing carrier), so `build_create` decodes to a list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiRequest, TelnyxClient};
use crate::enums::{api_enum, SortOrder};
use crate::error::ApiError;
use crate::pagination::{Page, PageParams};

api_enum! {
    pub enum PortingOrderStatus {
        Draft => "draft",
        InProcess => "in-process",
        Submitted => "submitted",
        Exception => "exception",
        FocDateConfirmed => "foc-date-confirmed",
        CancelPending => "cancel-pending",
        Ported => "ported",
        Cancelled => "cancelled",
    }
}

api_enum! {
    pub enum PortingOrderType {
        Full => "full",
        Partial => "partial",
    }
}

api_enum! {
    /// What happens to numbers on the losing account that are not ported.
    pub enum RemainingNumbersAction {
        Keep => "keep",
        Disconnect => "disconnect",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePortingOrderParams {
    pub phone_numbers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneNumberContains {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneNumbersFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumberContains>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivationSettingsFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_port_eligible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foc_datetime_requested: Option<DateRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiscFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<PortingOrderType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortingOrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PortingOrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<PhoneNumbersFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_settings: Option<ActivationSettingsFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc: Option<MiscFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortingOrderSort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPortingOrdersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<PortingOrderFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PortingOrderSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_phone_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageParams>,
}

#[derive(Serialize)]
struct RetrieveQuery {
    include_phone_numbers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndUserAdmin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_person_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_passcode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndUserLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<EndUserAdmin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EndUserLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Misc {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<PortingOrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_numbers_action: Option<RemainingNumbersAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_billing_phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_profile_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_address_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foc_datetime_requested: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foc_datetime_actual: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_port_eligible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_status: Option<String>,
}

/// Body of `PATCH /porting_orders/{id}`. Unset sections are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePortingOrderParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_user: Option<EndUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc: Option<Misc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_configuration: Option<PhoneNumberConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_settings: Option<ActivationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetail {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortingOrderStatusInfo {
    pub value: PortingOrderStatus,
    #[serde(default)]
    pub details: Vec<StatusDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortingPhoneNumber {
    pub phone_number: String,
    #[serde(default)]
    pub activation_status: Option<String>,
    #[serde(default)]
    pub portability_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortingOrder {
    pub id: Uuid,
    #[serde(default)]
    pub record_type: Option<String>,
    pub status: PortingOrderStatusInfo,
    #[serde(default)]
    pub customer_reference: Option<String>,
    #[serde(default)]
    pub support_key: Option<String>,
    #[serde(default)]
    pub porting_phone_numbers_count: Option<u32>,
    #[serde(default)]
    pub phone_numbers: Vec<PortingPhoneNumber>,
    #[serde(default)]
    pub old_service_provider_ocn: Option<String>,
    #[serde(default)]
    pub activation_settings: Option<ActivationSettings>,
    #[serde(default)]
    pub end_user: Option<EndUser>,
    #[serde(default)]
    pub misc: Option<Misc>,
    #[serde(default)]
    pub phone_number_configuration: Option<PhoneNumberConfiguration>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct PortingOrders<'c> {
    client: &'c TelnyxClient,
}

impl<'c> PortingOrders<'c> {
    pub(crate) fn new(client: &'c TelnyxClient) -> Self {
        Self { client }
    }

    pub fn build_create(
        &self,
        params: &CreatePortingOrderParams,
    ) -> Result<ApiRequest<Vec<PortingOrder>>, ApiError> {
        self.client.post("/porting_orders", params)
    }

    pub fn build_list(
        &self,
        params: &ListPortingOrdersParams,
    ) -> Result<ApiRequest<Page<PortingOrder>>, ApiError> {
        self.client.list("/porting_orders", params)
    }

    pub fn build_retrieve(
        &self,
        id: Uuid,
        include_phone_numbers: bool,
    ) -> Result<ApiRequest<PortingOrder>, ApiError> {
        self.client.get_with_query(
            &format!("/porting_orders/{id}"),
            &RetrieveQuery { include_phone_numbers },
        )
    }

    pub fn build_update(
        &self,
        id: Uuid,
        params: &UpdatePortingOrderParams,
    ) -> Result<ApiRequest<PortingOrder>, ApiError> {
        self.client.patch(&format!("/porting_orders/{id}"), params)
    }

    /// Only draft orders can be deleted; the server answers 204.
    pub fn build_delete(&self, id: Uuid) -> ApiRequest<()> {
        self.client.delete_empty(&format!("/porting_orders/{id}"))
    }

    pub fn build_confirm(&self, id: Uuid) -> ApiRequest<PortingOrder> {
        self.client
            .post_empty(&format!("/porting_orders/{id}/actions/confirm"))
    }

    pub fn build_cancel(&self, id: Uuid) -> ApiRequest<PortingOrder> {
        self.client
            .post_empty(&format!("/porting_orders/{id}/actions/cancel"))
    }
}
