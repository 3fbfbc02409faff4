//! WebSocket upgrade endpoint.

use crate::server::SignalRelay;
use crate::session;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::Extension;
use std::sync::Arc;

/// Upgrade handler: hands the accepted socket to a session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(relay): Extension<Arc<SignalRelay>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::run(relay, socket))
}
