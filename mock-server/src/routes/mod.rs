//! Route table, one module per API resource.

use axum::Router;

use crate::Db;

pub mod calls;
pub mod conferences;
pub mod messaging;
pub mod porting;
pub mod sim_cards;
pub mod wireguard;

pub fn router() -> Router<Db> {
    Router::new()
        .merge(messaging::router())
        .merge(calls::router())
        .merge(conferences::router())
        .merge(porting::router())
        .merge(sim_cards::router())
        .merge(wireguard::router())
}
