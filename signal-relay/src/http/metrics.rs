//! Prometheus metrics endpoint.

use crate::server::SignalRelay;
use axum::{http::header::CONTENT_TYPE, response::IntoResponse, Extension};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prometheus metrics handler.
///
/// Returns metrics in Prometheus text format.
/// Includes both gauges (current state) and counters (monotonic since startup).
pub async fn metrics_handler(Extension(relay): Extension<Arc<SignalRelay>>) -> impl IntoResponse {
    let m = relay.metrics();

    // Gauges — current state
    let connections = relay.connection_count();
    let rooms = relay.open_rooms();

    // Counters — monotonic since startup
    let conns_total = m.connections_total.load(Ordering::Relaxed);
    let rooms_created = m.rooms_created.load(Ordering::Relaxed);
    let joins = m.joins_total.load(Ordering::Relaxed);
    let relayed = m.messages_relayed.load(Ordering::Relaxed);
    let errors = m.errors_total.load(Ordering::Relaxed);

    let body = format!(
        r#"# HELP signal_relay_connections_active Number of live connections
# TYPE signal_relay_connections_active gauge
signal_relay_connections_active {connections}

# HELP signal_relay_rooms_open Number of currently-open rooms
# TYPE signal_relay_rooms_open gauge
signal_relay_rooms_open {rooms}

# HELP signal_relay_info Server information
# TYPE signal_relay_info gauge
signal_relay_info{{version="{version}"}} 1

# HELP signal_relay_connections_total Total connections accepted
# TYPE signal_relay_connections_total counter
signal_relay_connections_total {conns_total}

# HELP signal_relay_rooms_created_total Total rooms created
# TYPE signal_relay_rooms_created_total counter
signal_relay_rooms_created_total {rooms_created}

# HELP signal_relay_joins_total Total successful joins
# TYPE signal_relay_joins_total counter
signal_relay_joins_total {joins}

# HELP signal_relay_messages_relayed_total Total signaling messages relayed
# TYPE signal_relay_messages_relayed_total counter
signal_relay_messages_relayed_total {relayed}

# HELP signal_relay_errors_total Total command errors reported to senders
# TYPE signal_relay_errors_total counter
signal_relay_errors_total {errors}
"#,
        version = env!("CARGO_PKG_VERSION"),
    );

    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
