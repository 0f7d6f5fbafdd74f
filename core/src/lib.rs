//! Synchronous client for the Telnyx v2 REST API.
//!
//! # Overview
//! Request builders turn typed parameters into plain-data `HttpRequest`s and
//! decode `HttpResponse`s into typed models, without touching the network
//! (host-does-IO pattern). `Telnyx` adds the I/O: a `Transport`, timeout,
//! retries and pagination.
//!
//! ```no_run
//! use telnyx_core::resources::messages::SendMessageParams;
//! use telnyx_core::resources::sim_cards::ListSimCardsParams;
//! use telnyx_core::{ApiError, Telnyx};
//!
//! fn main() -> Result<(), ApiError> {
//!     let telnyx = Telnyx::from_env()?;
//!
//!     let params = SendMessageParams::sms("+18445550001", "+18445550002", "Hello");
//!     let message = telnyx.execute(telnyx.messages().build_send(&params)?)?;
//!     println!("queued {}", message.id);
//!
//!     let listing = telnyx.sim_cards().build_list(&ListSimCardsParams::default())?;
//!     for card in telnyx.paginate(listing) {
//!         println!("{}", card?.iccid);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Design
//! - `TelnyxClient` is stateless: base URL, API key and encoding options.
//! - Each resource service maps one method to one endpoint and returns an
//!   `ApiRequest<T>`, which carries the decoder for its own response.
//! - List parameters are serde structs flattened into deepObject query
//!   pairs (`filter[status]=...`) by `query::to_query_pairs`.
//! - Models are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod blocking;
pub mod client;
pub mod config;
pub mod enums;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;
pub mod resources;
pub mod transport;

pub use blocking::{PageIter, RetryPolicy, Telnyx};
pub use client::{ApiRequest, TelnyxClient};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorObject, ErrorSource};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pagination::{CursorPage, CursorParams, Page, PageParams, Paginated};
pub use query::ArrayFormat;
pub use resources::ActionResult;
pub use transport::Transport;
#[cfg(feature = "blocking")]
pub use transport::UreqTransport;
