//! In-memory mock of the Telnyx v2 API subset used by the client's
//! contract tests.
//!
//! Responses use the real envelopes: `{"data": ...}` on success,
//! `{"errors": [...]}` on failure, and the `meta` blocks of both pagination
//! styles. State lives in a single `RwLock<Store>`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequestParts, Path, Request,
    },
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub mod routes;

use routes::{
    calls::CallRecord, conferences::ConferenceRecord, messaging::MessageRecord,
    porting::PortingOrderRecord, sim_cards::SimCardRecord, wireguard::InterfaceRecord,
    wireguard::PeerRecord,
};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 250;

/// Everything the mock knows. Vectors keep insertion order so listings are
/// stable.
#[derive(Debug, Default)]
pub struct Store {
    pub messages: Vec<MessageRecord>,
    pub calls: Vec<CallRecord>,
    pub conferences: Vec<ConferenceRecord>,
    pub porting_orders: Vec<PortingOrderRecord>,
    pub sim_cards: Vec<SimCardRecord>,
    pub interfaces: Vec<InterfaceRecord>,
    pub peers: Vec<PeerRecord>,
}

impl Store {
    /// Store with the fixtures list endpoints need: five SIM cards and three
    /// active calls on connection `SEEDED_CONNECTION_ID`.
    pub fn seeded() -> Self {
        Self {
            sim_cards: routes::sim_cards::seed(),
            calls: routes::calls::seed(),
            ..Self::default()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .nest("/v2", routes::router())
        .with_state(db)
        .layer(middleware::from_fn(require_bearer))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if !authorized {
        return ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "10009",
            "Authentication failed",
            "The API key provided is missing or invalid.",
        )
        .into_response();
    }
    next.run(request).await
}

/// A failure rendered as `{"errors": [{code, title, detail, source}]}`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    title: &'static str,
    detail: String,
    pointer: Option<String>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, code: &'static str, title: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            code,
            title,
            detail: detail.into(),
            pointer: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "10005",
            "Resource not found",
            format!("The requested {resource} could not be found."),
        )
    }

    pub fn invalid(pointer: &str, detail: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.to_string()),
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "10015", "Invalid value", detail)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "10015",
            "Invalid request body",
            rejection.body_text(),
        )
    }
}

impl From<PathRejection> for ApiFailure {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "10015", "Invalid path parameter", rejection.body_text())
    }
}

/// `Path` whose rejection renders as an `ApiFailure`.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "title": self.title,
            "detail": self.detail,
        });
        if let Some(pointer) = self.pointer {
            error["source"] = json!({ "pointer": pointer });
        }
        (self.status, Json(json!({ "errors": [error] }))).into_response()
    }
}

pub type ApiResult = Result<Response, ApiFailure>;

/// `{"data": value}` with the given status.
pub fn data<T: Serialize>(status: StatusCode, value: T) -> ApiResult {
    Ok((status, Json(json!({ "data": value }))).into_response())
}

/// Offset pagination over an already filtered list.
pub fn page_of<T: Serialize>(items: Vec<T>, query: &HashMap<String, String>) -> ApiResult {
    let number = parse_positive(query, "page[number]", 1)?;
    let size = parse_positive(query, "page[size]", DEFAULT_PAGE_SIZE)?.min(MAX_PAGE_SIZE);
    let total_results = items.len();
    let total_pages = total_results.div_ceil(size).max(1);
    let offset = (number - 1)
        .checked_mul(size)
        .ok_or_else(|| ApiFailure::invalid("page[number]", "page[number] is out of range"))?;
    let page: Vec<T> = items.into_iter().skip(offset).take(size).collect();
    Ok(Json(json!({
        "data": page,
        "meta": {
            "page_number": number,
            "page_size": size,
            "total_pages": total_pages,
            "total_results": total_results,
        }
    }))
    .into_response())
}

pub fn parse_positive(query: &HashMap<String, String>, key: &str, default: usize) -> Result<usize, ApiFailure> {
    match query.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ApiFailure::invalid(key, format!("{key} must be a positive integer"))),
    }
}

/// Boolean query flag; anything other than `true`/`false` is ignored.
pub fn flag(query: &HashMap<String, String>, key: &str) -> Option<bool> {
    query.get(key).and_then(|raw| raw.parse().ok())
}

/// Values of a list parameter in any array form: comma-separated
/// (`filter[tags]=a,b`), repeated keys or `filter[tags][]=a`.
pub fn list(pairs: &[(String, String)], key: &str) -> Vec<String> {
    let bracketed = format!("{key}[]");
    pairs
        .iter()
        .filter(|(k, _)| k == key || *k == bracketed)
        .flat_map(|(_, raw)| raw.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shallow-merge `patch` object members into `target` (JSON merge patch,
/// recursing into nested objects).
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => merge(existing, value),
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn list_splits_commas() {
        let q = pairs(&[("filter[tags]", "a, b,,c")]);
        assert_eq!(list(&q, "filter[tags]"), vec!["a", "b", "c"]);
        assert!(list(&q, "filter[status]").is_empty());
    }

    #[test]
    fn list_accepts_brackets_and_repeated_keys() {
        let q = pairs(&[
            ("filter[tags][]", "a"),
            ("filter[tags][]", "b"),
            ("filter[status]", "enabled"),
            ("filter[status]", "standby"),
        ]);
        assert_eq!(list(&q, "filter[tags]"), vec!["a", "b"]);
        assert_eq!(list(&q, "filter[status]"), vec!["enabled", "standby"]);
    }

    #[test]
    fn flag_parses_booleans_only() {
        let q = query(&[("a", "true"), ("b", "yes")]);
        assert_eq!(flag(&q, "a"), Some(true));
        assert_eq!(flag(&q, "b"), None);
    }

    #[test]
    fn parse_positive_rejects_zero() {
        let q = query(&[("page[number]", "0")]);
        let err = parse_positive(&q, "page[number]", 1).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn merge_recurses_into_objects() {
        let mut target = json!({"end_user": {"admin": {"entity_name": "A"}, "location": {"locality": "X"}}});
        merge(&mut target, json!({"end_user": {"admin": {"entity_name": "B"}}, "webhook_url": "u"}));
        assert_eq!(
            target,
            json!({"end_user": {"admin": {"entity_name": "B"}, "location": {"locality": "X"}}, "webhook_url": "u"})
        );
    }
}
