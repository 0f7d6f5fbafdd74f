//! Executing client: wires the request builders to a `Transport` and applies
//! timeout and retry policy.
//!
//! # Design
//! `Telnyx` owns a `TelnyxClient` for request building, a boxed `Transport`
//! for I/O and a `RetryPolicy`. `execute` runs one `ApiRequest` to
//! completion; `paginate` chains requests lazily, one page at a time.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info_span, warn};

use crate::client::{ApiRequest, TelnyxClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpResponse;
use crate::pagination::Paginated;
use crate::resources::{
    Calls, Conferences, Messages, PortingOrders, SimCards, WireguardInterfaces, WireguardPeers,
};
use crate::transport::Transport;

/// Server-provided delays above this are ignored in favour of backoff.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Exponential backoff for retryable failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`: `initial * 2^attempt`,
    /// capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) if delay <= MAX_RETRY_AFTER => delay,
            _ => self.backoff(attempt),
        }
    }
}

/// Parse `retry-after-ms` or `Retry-After` (whole seconds) from a response.
/// Values that do not fit a `Duration` are ignored.
pub fn retry_after(response: &HttpResponse) -> Option<Duration> {
    let from_ms = response
        .header("retry-after-ms")
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|ms| *ms >= 0.0)
        .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok());
    from_ms.or_else(|| {
        response
            .header("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    })
}

/// Synchronous Telnyx client that performs the HTTP round-trips itself.
pub struct Telnyx {
    client: TelnyxClient,
    transport: Box<dyn Transport>,
    retry: RetryPolicy,
}

impl Telnyx {
    /// Client over the default ureq transport using `config.timeout`.
    #[cfg(feature = "blocking")]
    pub fn new(config: ClientConfig) -> Self {
        let transport = crate::transport::UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    #[cfg(feature = "blocking")]
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            client: TelnyxClient::from_config(&config),
            transport: Box::new(transport),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &TelnyxClient {
        &self.client
    }

    pub fn messages(&self) -> Messages<'_> {
        self.client.messages()
    }

    pub fn calls(&self) -> Calls<'_> {
        self.client.calls()
    }

    pub fn conferences(&self) -> Conferences<'_> {
        self.client.conferences()
    }

    pub fn porting_orders(&self) -> PortingOrders<'_> {
        self.client.porting_orders()
    }

    pub fn sim_cards(&self) -> SimCards<'_> {
        self.client.sim_cards()
    }

    pub fn wireguard_interfaces(&self) -> WireguardInterfaces<'_> {
        self.client.wireguard_interfaces()
    }

    pub fn wireguard_peers(&self) -> WireguardPeers<'_> {
        self.client.wireguard_peers()
    }

    /// Send `request`, retrying retryable failures, and decode the response.
    pub fn execute<T>(&self, request: ApiRequest<T>) -> Result<T, ApiError> {
        let span = info_span!(
            "telnyx_request",
            method = request.http.method.as_str(),
            path = %request.http.path,
        );
        let _entered = span.enter();

        let mut attempt = 0;
        loop {
            let started = Instant::now();
            let (result, server_delay) = match self.transport.execute(&request.http) {
                Ok(response) => {
                    debug!(
                        status = response.status,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        attempt,
                        "response received"
                    );
                    let server_delay = retry_after(&response);
                    (request.parse(response), server_delay)
                }
                Err(err) => {
                    debug!(error = %err, attempt, "transport failed");
                    (Err(err), None)
                }
            };

            match result {
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt, server_delay);
                    warn!(
                        error = %err,
                        retry = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Iterate over every item of a paginated listing, fetching pages on
    /// demand. The iterator ends after the last page or the first error.
    pub fn paginate<P: Paginated>(&self, request: ApiRequest<P>) -> PageIter<'_, P> {
        PageIter {
            telnyx: self,
            next: Some(request),
            buffer: Vec::new().into_iter(),
        }
    }
}

pub struct PageIter<'t, P: Paginated> {
    telnyx: &'t Telnyx,
    next: Option<ApiRequest<P>>,
    buffer: std::vec::IntoIter<P::Item>,
}

impl<P: Paginated> Iterator for PageIter<'_, P> {
    type Item = Result<P::Item, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }
            let request = self.next.take()?;
            let page = match self.telnyx.execute(request.clone()) {
                Ok(page) => page,
                Err(err) => return Some(Err(err)),
            };
            self.next = page
                .next_page_param()
                // A server that repeats the current page would loop forever.
                .filter(|(key, value)| request.http.query_param(key) != Some(value.as_str()))
                .map(|(key, value)| {
                    let mut next = request.with_query_param(key, value);
                    for stale in P::STALE_PARAMS {
                        next.http.remove_query_param(stale);
                    }
                    next
                });
            self.buffer = page.into_items().into_iter();
        }
    }
}
