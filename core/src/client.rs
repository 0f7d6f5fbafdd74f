//! Stateless HTTP request builder for the Telnyx API.
//!
//! # Design
//! `TelnyxClient` holds the base URL, API key and encoding options and
//! carries no mutable state between calls. Resource services borrow it and
//! turn typed parameters into `ApiRequest<T>` values. An `ApiRequest` pairs
//! the plain-data `HttpRequest` with the decoder for its response, so the
//! caller (or `Telnyx`) executes the round-trip and hands the
//! `HttpResponse` back to `ApiRequest::parse`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{to_query_pairs, ArrayFormat};
use crate::resources::{
    Calls, Conferences, Messages, PortingOrders, SimCards, WireguardInterfaces, WireguardPeers,
};

/// A request ready to be executed, typed by the value its response decodes to.
pub struct ApiRequest<T> {
    pub http: HttpRequest,
    decode: fn(&str) -> Result<T, ApiError>,
}

impl<T> ApiRequest<T> {
    /// Map a response to the decoded value: 404 becomes `ApiError::NotFound`,
    /// any other non-2xx becomes `ApiError::HttpError`.
    pub fn parse(&self, response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        (self.decode)(&response.body)
    }

    pub fn with_query_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.http.set_query_param(key, value);
        self
    }

    pub fn into_http(self) -> HttpRequest {
        self.http
    }
}

impl<T> Clone for ApiRequest<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            decode: self.decode,
        }
    }
}

impl<T> fmt::Debug for ApiRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest").field("http", &self.http).finish()
    }
}

/// Synchronous, stateless request builder for the Telnyx API.
#[derive(Clone)]
pub struct TelnyxClient {
    base_url: String,
    api_key: String,
    user_agent: String,
    array_format: ArrayFormat,
}

impl TelnyxClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            array_format: ArrayFormat::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
            array_format: config.array_format,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    pub fn calls(&self) -> Calls<'_> {
        Calls::new(self)
    }

    pub fn conferences(&self) -> Conferences<'_> {
        Conferences::new(self)
    }

    pub fn porting_orders(&self) -> PortingOrders<'_> {
        PortingOrders::new(self)
    }

    pub fn sim_cards(&self) -> SimCards<'_> {
        SimCards::new(self)
    }

    pub fn wireguard_interfaces(&self) -> WireguardInterfaces<'_> {
        WireguardInterfaces::new(self)
    }

    pub fn wireguard_peers(&self) -> WireguardPeers<'_> {
        WireguardPeers::new(self)
    }

    // -----------------------------------------------------------------------
    // Building blocks used by the resource services
    // -----------------------------------------------------------------------

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query: Vec::new(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), self.user_agent.clone()),
            ],
            body: None,
        }
    }

    fn with_json<B: Serialize + ?Sized>(
        &self,
        mut request: HttpRequest,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    fn with_query<Q: Serialize + ?Sized>(
        &self,
        mut request: HttpRequest,
        query: &Q,
    ) -> Result<HttpRequest, ApiError> {
        request.query = to_query_pairs(query, self.array_format)?;
        Ok(request)
    }

    /// GET returning the `data` member of the response.
    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> ApiRequest<T> {
        ApiRequest {
            http: self.request(HttpMethod::Get, path),
            decode: decode_data::<T>,
        }
    }

    /// GET with query parameters returning the `data` member.
    pub(crate) fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<ApiRequest<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Ok(ApiRequest {
            http: self.with_query(self.request(HttpMethod::Get, path), query)?,
            decode: decode_data::<T>,
        })
    }

    /// GET returning a whole page envelope.
    pub(crate) fn list<P, Q>(&self, path: &str, query: &Q) -> Result<ApiRequest<P>, ApiError>
    where
        P: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        Ok(ApiRequest {
            http: self.with_query(self.request(HttpMethod::Get, path), query)?,
            decode: decode_body::<P>,
        })
    }

    pub(crate) fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiRequest<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(ApiRequest {
            http: self.with_json(self.request(HttpMethod::Post, path), body)?,
            decode: decode_data::<T>,
        })
    }

    /// POST without a request body (used by parameterless actions).
    pub(crate) fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiRequest<T> {
        ApiRequest {
            http: self.request(HttpMethod::Post, path),
            decode: decode_data::<T>,
        }
    }

    pub(crate) fn patch<T, B>(&self, path: &str, body: &B) -> Result<ApiRequest<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(ApiRequest {
            http: self.with_json(self.request(HttpMethod::Patch, path), body)?,
            decode: decode_data::<T>,
        })
    }

    /// DELETE returning the removed resource.
    pub(crate) fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiRequest<T> {
        ApiRequest {
            http: self.request(HttpMethod::Delete, path),
            decode: decode_data::<T>,
        }
    }

    /// DELETE answered with an empty body.
    pub(crate) fn delete_empty(&self, path: &str) -> ApiRequest<()> {
        ApiRequest {
            http: self.request(HttpMethod::Delete, path),
            decode: decode_empty,
        }
    }
}

impl fmt::Debug for TelnyxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelnyxClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("array_format", &self.array_format)
            .finish()
    }
}

/// Characters left as-is inside a path segment (RFC 3986 unreserved plus
/// `:`, which call control ids carry).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':');

/// Percent-encode a caller-supplied path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str::<DataEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn decode_empty(_body: &str) -> Result<(), ApiError> {
    Ok(())
}
