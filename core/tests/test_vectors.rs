//! Verify request builders and decoders against JSON vectors in `test-vectors/`.
//!
//! Each vector lists typed inputs, the expected request (method, path, query
//! pairs in order, JSON body), a simulated response and the fields the
//! decoded value must carry. Bodies and decoded values are compared as JSON
//! values so field ordering does not matter; query pairs are compared in
//! order because servers may be sensitive to it.

use serde_json::Value;
use telnyx_core::resources::messages::{NumberPoolMessageParams, SendMessageParams};
use telnyx_core::resources::porting_orders::ListPortingOrdersParams;
use telnyx_core::resources::sim_cards::ListSimCardsParams;
use telnyx_core::{ApiError, ApiRequest, HttpMethod, HttpResponse, Paginated, TelnyxClient};

const BASE_URL: &str = "http://localhost:3000/v2";

fn client() -> TelnyxClient {
    TelnyxClient::new(BASE_URL, "KEY_VECTOR")
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn response(case: &Value) -> HttpResponse {
    let body = &case["response"]["body"];
    HttpResponse {
        status: case["response"]["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: match body {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        },
    }
}

/// Check method, path, ordered query pairs, auth header and JSON body.
fn assert_request<T>(name: &str, req: &ApiRequest<T>, expected: &Value) {
    let http = &req.http;
    assert_eq!(http.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        http.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );

    let expected_query: Vec<(String, String)> = expected["query"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(http.query, expected_query, "{name}: query");

    assert_eq!(http.header("Authorization"), Some("Bearer KEY_VECTOR"), "{name}: auth");
    match expected.get("body") {
        Some(body) => {
            assert_eq!(http.header("Content-Type"), Some("application/json"), "{name}: content type");
            let actual: Value = serde_json::from_str(http.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(http.body.is_none(), "{name}: unexpected body"),
    }
}

/// Every `pointer -> value` in `expected_fields` must match the decoded value.
fn assert_fields<T: serde::Serialize>(name: &str, decoded: &T, case: &Value) {
    let actual = serde_json::to_value(decoded).unwrap();
    for (pointer, expected) in case["expected_fields"].as_object().unwrap() {
        assert_eq!(actual.pointer(pointer), Some(expected), "{name}: field {pointer}");
    }
}

fn assert_next_page<P: Paginated>(name: &str, page: &P, case: &Value) {
    let expected = match &case["expected_next_page"] {
        Value::Null => None,
        Value::Array(pair) => Some((pair[0].as_str().unwrap(), pair[1].as_str().unwrap().to_string())),
        other => panic!("{name}: bad expected_next_page {other}"),
    };
    assert_eq!(page.next_page_param(), expected, "{name}: next page");
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[test]
fn messages_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/messages.json")) {
        let name = case["name"].as_str().unwrap();
        let req = match case["operation"].as_str().unwrap() {
            "send" => {
                let input: SendMessageParams = serde_json::from_value(case["input"].clone()).unwrap();
                c.messages().build_send(&input).unwrap()
            }
            "send_with_number_pool" => {
                let input: NumberPoolMessageParams = serde_json::from_value(case["input"].clone()).unwrap();
                c.messages().build_send_with_number_pool(&input).unwrap()
            }
            other => panic!("{name}: unknown operation {other}"),
        };
        assert_request(name, &req, &case["expected_request"]);

        let message = req.parse(response(&case)).unwrap();
        assert_fields(name, &message, &case);
    }
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[test]
fn sim_card_list_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/sim_cards.json")) {
        let name = case["name"].as_str().unwrap();
        let input: ListSimCardsParams = serde_json::from_value(case["input"].clone()).unwrap();
        let req = c.sim_cards().build_list(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let page = req.parse(response(&case)).unwrap();
        assert_fields(name, &page, &case);
        assert_next_page(name, &page, &case);
    }
}

#[test]
fn porting_order_list_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/porting_orders.json")) {
        let name = case["name"].as_str().unwrap();
        let input: ListPortingOrdersParams = serde_json::from_value(case["input"].clone()).unwrap();
        let req = c.porting_orders().build_list(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let page = req.parse(response(&case)).unwrap();
        assert_fields(name, &page, &case);
        assert_next_page(name, &page, &case);
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_vectors() {
    let req = client().messages().build_retrieve(uuid::Uuid::nil());
    for case in load(include_str!("../../test-vectors/errors.json")) {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected"];
        let err = req.parse(response(&case)).unwrap_err();

        match expected["kind"].as_str().unwrap() {
            "not_found" => assert!(matches!(err, ApiError::NotFound { .. }), "{name}: kind"),
            "http" => assert!(matches!(err, ApiError::HttpError { .. }), "{name}: kind"),
            other => panic!("{name}: unknown kind {other}"),
        }
        assert_eq!(err.status(), expected["status"].as_u64().map(|s| s as u16), "{name}: status");
        assert_eq!(err.is_retryable(), expected["retryable"].as_bool().unwrap(), "{name}: retryable");

        let codes: Vec<&str> = err.errors().iter().filter_map(|e| e.code.as_deref()).collect();
        let expected_codes: Vec<&str> = expected["codes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c.as_str().unwrap())
            .collect();
        assert_eq!(codes, expected_codes, "{name}: codes");

        if let Some(display) = expected.get("display") {
            assert_eq!(err.to_string(), display.as_str().unwrap(), "{name}: display");
        }
        if let Some(pointer) = expected.get("pointer") {
            let source = err.errors()[0].source.as_ref().unwrap();
            assert_eq!(source.pointer.as_deref(), pointer.as_str(), "{name}: pointer");
        }
    }
}
