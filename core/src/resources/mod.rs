//! Per-resource services.
//!
//! Each service borrows a `TelnyxClient` and maps one method to one
//! endpoint: parameters in, `ApiRequest<T>` out. Models for a resource live
//! next to its service.

pub mod calls;
pub mod conferences;
pub mod messages;
pub mod porting_orders;
pub mod sim_cards;
pub mod wireguard;

use serde::{Deserialize, Serialize};

pub use calls::Calls;
pub use conferences::Conferences;
pub use messages::Messages;
pub use porting_orders::PortingOrders;
pub use sim_cards::SimCards;
pub use wireguard::{WireguardInterfaces, WireguardPeers};

/// `{"data": {"result": "ok"}}` acknowledgement returned by command endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub result: String,
}

impl ActionResult {
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}
