//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives `Telnyx`
//! over real HTTP through `UreqTransport`. This checks that request
//! building, query encoding, transport and response decoding agree with a
//! server that was written independently of the models.

use telnyx_core::resources::calls::{
    AnswerParams, BridgeParams, CommandParams, DialParams, RecordStartParams, RecordingChannels,
    RecordingFormat, SpeakParams, TransferParams,
};
use telnyx_core::resources::conferences::{
    ConferenceFilter, ConferenceStatus, CreateConferenceParams, JoinConferenceParams,
    LeaveConferenceParams, ListConferencesParams, ListParticipantsParams, ParticipantFilter,
    ParticipantsCommandParams,
};
use telnyx_core::resources::messages::{MessageType, NumberPoolMessageParams, SendMessageParams};
use telnyx_core::resources::porting_orders::{
    CreatePortingOrderParams, EndUser, EndUserAdmin, ListPortingOrdersParams, PhoneNumberContains,
    PhoneNumbersFilter, PortingOrderFilter, PortingOrderStatus, UpdatePortingOrderParams,
};
use telnyx_core::resources::sim_cards::{
    ListSimCardsParams, RetrieveSimCardParams, SimCardActionStatus, SimCardActionType, SimCardFilter,
    SimCardStatus, UpdateSimCardParams,
};
use telnyx_core::resources::wireguard::{
    CreateWireguardInterfaceParams, CreateWireguardPeerParams, InterfaceStatus,
    ListWireguardInterfacesParams, ListWireguardPeersParams, UpdateWireguardPeerParams,
    WireguardInterfaceFilter, WireguardPeerFilter,
};
use telnyx_core::{ApiError, ArrayFormat, ClientConfig, CursorParams, PageParams, RetryPolicy, Telnyx};
use uuid::Uuid;

const SEEDED_CONNECTION_ID: &str = "1494404757140276705";

/// Start the mock server on a random port and return its `/v2` base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/v2")
}

fn telnyx_with_key(api_key: &str) -> Telnyx {
    let config = ClientConfig::new(api_key).with_base_url(spawn_server());
    Telnyx::new(config).with_retry_policy(RetryPolicy::none())
}

fn telnyx() -> Telnyx {
    telnyx_with_key("KEY_TEST")
}

fn dial(telnyx: &Telnyx, connection_id: &str, to: &str) -> String {
    let params = DialParams {
        connection_id: connection_id.into(),
        to: to.into(),
        from: "+18445550001".into(),
        ..Default::default()
    };
    let call = telnyx.execute(telnyx.calls().build_dial(&params).unwrap()).unwrap();
    assert!(call.is_alive);
    call.call_control_id
}

#[test]
fn messaging_send_and_retrieve() {
    let telnyx = telnyx();

    let params = SendMessageParams::sms("+18445550001", "+18445550002", "Hello from Rust");
    let sent = telnyx.execute(telnyx.messages().build_send(&params).unwrap()).unwrap();
    assert_eq!(sent.message_type, Some(MessageType::Sms));
    assert_eq!(sent.to[0].phone_number, "+18445550002");

    let fetched = telnyx.execute(telnyx.messages().build_retrieve(sent.id)).unwrap();
    assert_eq!(fetched.id, sent.id);
    assert_eq!(fetched.text.as_deref(), Some("Hello from Rust"));

    let pooled = NumberPoolMessageParams {
        messaging_profile_id: "16fd2706-8baf-433b-82eb-8c7fada847da".into(),
        to: "+18445550003".into(),
        text: Some("From the pool".into()),
        ..Default::default()
    };
    let sent = telnyx
        .execute(telnyx.messages().build_send_with_number_pool(&pooled).unwrap())
        .unwrap();
    assert!(sent.from.is_some());
}

#[test]
fn sim_card_filters_in_every_array_format() {
    let base_url = spawn_server();
    for format in [ArrayFormat::Comma, ArrayFormat::Brackets, ArrayFormat::Repeat] {
        let config = ClientConfig::new("KEY")
            .with_base_url(base_url.clone())
            .with_array_format(format);
        let telnyx = Telnyx::new(config).with_retry_policy(RetryPolicy::none());

        let by_tags = ListSimCardsParams {
            filter: Some(SimCardFilter {
                tags: Some(vec!["iot".into(), "fleet".into()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let page = telnyx.execute(telnyx.sim_cards().build_list(&by_tags).unwrap()).unwrap();
        assert_eq!(page.data.len(), 2, "{format:?}: tags");

        let by_status = ListSimCardsParams {
            filter: Some(SimCardFilter {
                status: Some(vec![SimCardStatus::Disabled, SimCardStatus::Standby]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let page = telnyx.execute(telnyx.sim_cards().build_list(&by_status).unwrap()).unwrap();
        assert_eq!(page.data.len(), 2, "{format:?}: status");
    }
}

#[test]
fn sim_cards_paginate_filter_and_act() {
    let telnyx = telnyx();

    let params = ListSimCardsParams {
        page: Some(PageParams::new(1, 2)),
        ..Default::default()
    };
    let cards: Vec<_> = telnyx
        .paginate(telnyx.sim_cards().build_list(&params).unwrap())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(cards.len(), 5);

    let params = ListSimCardsParams {
        filter: Some(SimCardFilter {
            tags: Some(vec!["iot".into(), "fleet".into()]),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = telnyx.execute(telnyx.sim_cards().build_list(&params).unwrap()).unwrap();
    assert_eq!(page.data.len(), 2);
    assert!(!page.has_next_page());

    let params = ListSimCardsParams {
        filter: Some(SimCardFilter {
            status: Some(vec![SimCardStatus::Disabled]),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = telnyx.execute(telnyx.sim_cards().build_list(&params).unwrap()).unwrap();
    let disabled = page.data[0].id;

    let action = telnyx.execute(telnyx.sim_cards().build_enable(disabled)).unwrap();
    assert_eq!(action.action_type, SimCardActionType::Enable);
    assert_eq!(action.status.value, SimCardActionStatus::InProgress);

    let card = telnyx
        .execute(
            telnyx
                .sim_cards()
                .build_retrieve(disabled, &RetrieveSimCardParams::default())
                .unwrap(),
        )
        .unwrap();
    assert_eq!(card.status.value, SimCardStatus::Enabled);

    let standby = telnyx.execute(telnyx.sim_cards().build_set_standby(disabled)).unwrap();
    assert_eq!(standby.action_type, SimCardActionType::SetStandby);
    let disable = telnyx.execute(telnyx.sim_cards().build_disable(disabled)).unwrap();
    assert_eq!(disable.action_type, SimCardActionType::Disable);

    let update = UpdateSimCardParams {
        tags: Some(vec!["retired".into()]),
        ..Default::default()
    };
    let updated = telnyx
        .execute(telnyx.sim_cards().build_update(disabled, &update).unwrap())
        .unwrap();
    assert_eq!(updated.tags, vec!["retired"]);

    let deleted = telnyx.execute(telnyx.sim_cards().build_delete(disabled)).unwrap();
    assert_eq!(deleted.id, disabled);
    let err = telnyx
        .execute(
            telnyx
                .sim_cards()
                .build_retrieve(disabled, &RetrieveSimCardParams::default())
                .unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn call_control_flow() {
    let telnyx = telnyx();
    let calls = telnyx.calls();

    let a = dial(&telnyx, "conn-1", "+18445550002");
    let b = dial(&telnyx, "conn-1", "+18445550003");

    assert!(telnyx.execute(calls.build_answer(&a, &AnswerParams::default()).unwrap()).unwrap().is_ok());

    let speak = SpeakParams {
        payload: "Please hold".into(),
        voice: "female".into(),
        language: Some("en-US".into()),
        ..Default::default()
    };
    assert!(telnyx.execute(calls.build_speak(&a, &speak).unwrap()).unwrap().is_ok());

    let record = RecordStartParams {
        format: Some(RecordingFormat::Mp3),
        channels: Some(RecordingChannels::Dual),
        ..Default::default()
    };
    telnyx.execute(calls.build_record_start(&a, &record).unwrap()).unwrap();
    telnyx
        .execute(calls.build_record_stop(&a, &CommandParams::default()).unwrap())
        .unwrap();

    let bridge = BridgeParams {
        call_control_id: b.clone(),
        ..Default::default()
    };
    telnyx.execute(calls.build_bridge(&a, &bridge).unwrap()).unwrap();

    let transfer = TransferParams {
        to: "+18445550009".into(),
        ..Default::default()
    };
    telnyx.execute(calls.build_transfer(&b, &transfer).unwrap()).unwrap();

    telnyx
        .execute(calls.build_hangup(&a, &CommandParams::default()).unwrap())
        .unwrap();
    let status = telnyx.execute(calls.build_retrieve_status(&a)).unwrap();
    assert!(!status.is_alive);
    assert!(status.end_time.is_some());

    let err = telnyx
        .execute(calls.build_hangup(&a, &CommandParams::default()).unwrap())
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.errors()[0].code.as_deref(), Some("90018"));
}

#[test]
fn active_calls_follow_cursors() {
    let telnyx = telnyx();
    let page = CursorParams {
        limit: Some(2),
        ..Default::default()
    };

    let first = telnyx
        .execute(telnyx.calls().build_list_active(SEEDED_CONNECTION_ID, &page).unwrap())
        .unwrap();
    assert_eq!(first.data.len(), 2);
    assert!(first.next_cursor().is_some());

    let all: Vec<_> = telnyx
        .paginate(telnyx.calls().build_list_active(SEEDED_CONNECTION_ID, &page).unwrap())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(all.len(), 3);

    let none = telnyx
        .execute(telnyx.calls().build_list_active("unknown-connection", &page).unwrap())
        .unwrap();
    assert!(none.data.is_empty());
    assert!(none.next_cursor().is_none());
}

#[test]
fn conference_lifecycle() {
    let telnyx = telnyx();
    let conferences = telnyx.conferences();
    let host = dial(&telnyx, "conn-1", "+18445550002");
    let guest = dial(&telnyx, "conn-1", "+18445550003");

    let create = CreateConferenceParams {
        call_control_id: host.clone(),
        name: "weekly-sync".into(),
        ..Default::default()
    };
    let conference = telnyx.execute(conferences.build_create(&create).unwrap()).unwrap();
    assert_eq!(conference.status, Some(ConferenceStatus::InProgress));

    let join = JoinConferenceParams {
        call_control_id: guest.clone(),
        ..Default::default()
    };
    assert!(telnyx.execute(conferences.build_join(conference.id, &join).unwrap()).unwrap().is_ok());

    let guest_only = ParticipantsCommandParams {
        call_control_ids: vec![guest.clone()],
        ..Default::default()
    };
    telnyx.execute(conferences.build_mute(conference.id, &guest_only).unwrap()).unwrap();
    telnyx.execute(conferences.build_hold(conference.id, &guest_only).unwrap()).unwrap();

    let muted = ListParticipantsParams {
        filter: Some(ParticipantFilter {
            muted: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = telnyx
        .execute(conferences.build_list_participants(conference.id, &muted).unwrap())
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].call_control_id, guest);
    assert!(page.data[0].on_hold);

    let everyone = ParticipantsCommandParams::default();
    telnyx.execute(conferences.build_unmute(conference.id, &everyone).unwrap()).unwrap();
    telnyx.execute(conferences.build_unhold(conference.id, &everyone).unwrap()).unwrap();
    let page = telnyx
        .execute(conferences.build_list_participants(conference.id, &muted).unwrap())
        .unwrap();
    assert!(page.data.is_empty());

    let leave = LeaveConferenceParams {
        call_control_id: guest,
        ..Default::default()
    };
    telnyx.execute(conferences.build_leave(conference.id, &leave).unwrap()).unwrap();
    let page = telnyx
        .execute(
            conferences
                .build_list_participants(conference.id, &ListParticipantsParams::default())
                .unwrap(),
        )
        .unwrap();
    assert_eq!(page.data.len(), 1);

    let list = ListConferencesParams {
        filter: Some(ConferenceFilter {
            name: Some("weekly-sync".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = telnyx.execute(conferences.build_list(&list).unwrap()).unwrap();
    assert_eq!(page.data.len(), 1);
    let fetched = telnyx.execute(conferences.build_retrieve(conference.id)).unwrap();
    assert_eq!(fetched.name, "weekly-sync");
}

#[test]
fn porting_order_lifecycle() {
    let telnyx = telnyx();
    let porting = telnyx.porting_orders();

    let create = CreatePortingOrderParams {
        phone_numbers: vec!["+13035550000".into(), "+13035550001".into(), "+14155550000".into()],
        customer_reference: Some("ticket-42".into()),
    };
    let orders = telnyx.execute(porting.build_create(&create).unwrap()).unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.status.value == PortingOrderStatus::Draft));
    let (first, second) = (orders[0].id, orders[1].id);

    let list = ListPortingOrdersParams {
        filter: Some(PortingOrderFilter {
            phone_numbers: Some(PhoneNumbersFilter {
                phone_number: Some(PhoneNumberContains {
                    contains: Some("303555".into()),
                }),
            }),
            ..Default::default()
        }),
        ..Default::default()
    };
    let page = telnyx.execute(porting.build_list(&list).unwrap()).unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, first);

    let bare = telnyx.execute(porting.build_retrieve(first, false).unwrap()).unwrap();
    assert!(bare.phone_numbers.is_empty());
    let full = telnyx.execute(porting.build_retrieve(first, true).unwrap()).unwrap();
    assert_eq!(full.phone_numbers.len(), 2);

    let err = telnyx.execute(porting.build_confirm(first)).unwrap_err();
    assert_eq!(err.status(), Some(422));

    let update = UpdatePortingOrderParams {
        end_user: Some(EndUser {
            admin: Some(EndUserAdmin {
                entity_name: Some("Acme Corp".into()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };
    let updated = telnyx.execute(porting.build_update(first, &update).unwrap()).unwrap();
    let admin = updated.end_user.and_then(|u| u.admin).unwrap();
    assert_eq!(admin.entity_name.as_deref(), Some("Acme Corp"));

    let confirmed = telnyx.execute(porting.build_confirm(first)).unwrap();
    assert_eq!(confirmed.status.value, PortingOrderStatus::InProcess);
    let cancelled = telnyx.execute(porting.build_cancel(first)).unwrap();
    assert_eq!(cancelled.status.value, PortingOrderStatus::Cancelled);

    telnyx.execute(porting.build_delete(second)).unwrap();
    let err = telnyx.execute(porting.build_retrieve(second, true).unwrap()).unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn wireguard_interfaces_and_peers() {
    let telnyx = telnyx();
    let network_id = Uuid::new_v4();

    let create = CreateWireguardInterfaceParams {
        network_id,
        name: Some("office".into()),
        ..Default::default()
    };
    let iface = telnyx
        .execute(telnyx.wireguard_interfaces().build_create(&create).unwrap())
        .unwrap();
    assert_eq!(iface.status, Some(InterfaceStatus::Provisioning));

    let list = ListWireguardInterfacesParams {
        filter: Some(WireguardInterfaceFilter {
            network_id: Some(network_id),
        }),
        ..Default::default()
    };
    let page = telnyx
        .execute(telnyx.wireguard_interfaces().build_list(&list).unwrap())
        .unwrap();
    assert_eq!(page.data.len(), 1);
    let fetched = telnyx
        .execute(telnyx.wireguard_interfaces().build_retrieve(iface.id))
        .unwrap();
    assert_eq!(fetched.network_id, network_id);

    let peer = telnyx
        .execute(
            telnyx
                .wireguard_peers()
                .build_create(&CreateWireguardPeerParams {
                    wireguard_interface_id: iface.id,
                    public_key: None,
                })
                .unwrap(),
        )
        .unwrap();
    assert!(peer.private_key.is_some());

    let update = UpdateWireguardPeerParams {
        public_key: Some("qF4EqlZq+5tl9SmkxDtQvw6jt2H3YmwFTVoR2xsKMfA=".into()),
    };
    let updated = telnyx
        .execute(telnyx.wireguard_peers().build_update(peer.id, &update).unwrap())
        .unwrap();
    assert_eq!(updated.public_key, update.public_key);
    assert!(updated.private_key.is_none());

    let peers = ListWireguardPeersParams {
        filter: Some(WireguardPeerFilter {
            wireguard_interface_id: Some(iface.id),
        }),
        ..Default::default()
    };
    let page = telnyx.execute(telnyx.wireguard_peers().build_list(&peers).unwrap()).unwrap();
    assert_eq!(page.data.len(), 1);
    let fetched = telnyx.execute(telnyx.wireguard_peers().build_retrieve(peer.id)).unwrap();
    assert_eq!(fetched.id, peer.id);

    let removed = telnyx.execute(telnyx.wireguard_peers().build_delete(peer.id)).unwrap();
    assert_eq!(removed.id, peer.id);
    let deleted = telnyx
        .execute(telnyx.wireguard_interfaces().build_delete(iface.id))
        .unwrap();
    assert_eq!(deleted.status, Some(InterfaceStatus::Deleting));
}

#[test]
fn missing_api_key_is_rejected() {
    let telnyx = telnyx_with_key("");
    let err = telnyx
        .execute(telnyx.sim_cards().build_list(&ListSimCardsParams::default()).unwrap())
        .unwrap_err();
    match err {
        ApiError::HttpError { status, ref errors, .. } => {
            assert_eq!(status, 401);
            assert_eq!(errors[0].code.as_deref(), Some("10009"));
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[test]
fn validation_errors_carry_pointer() {
    let telnyx = telnyx();
    let params = SendMessageParams::sms("+18445550001", "not-a-number", "Hello");
    let err = telnyx.execute(telnyx.messages().build_send(&params).unwrap()).unwrap_err();
    assert_eq!(err.status(), Some(422));
    let source = err.errors()[0].source.as_ref().unwrap();
    assert_eq!(source.pointer.as_deref(), Some("/to"));
}

#[test]
fn unknown_resource_is_not_found() {
    let telnyx = telnyx();
    let err = telnyx
        .execute(telnyx.messages().build_retrieve(Uuid::nil()))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().starts_with("resource not found"));
}
