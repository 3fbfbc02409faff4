//! Per-connection WebSocket session.
//!
//! Each accepted socket gets one session: a writer task that drains the
//! connection's registry channel into the socket, and a read loop that feeds
//! frames to the room coordinator. The terminal path unregisters the
//! connection and then runs room cleanup, in that order.

use crate::server::SignalRelay;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run a connection to completion: register, pump frames, clean up.
pub async fn run(relay: Arc<SignalRelay>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = relay.connect(tx);

    // Writer task: the registry channel is the only way frames reach this
    // socket. It ends when the connection is unregistered and the channel
    // drains.
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                // Socket is gone; the read side observes it too and cleans up.
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => relay.handle_message(client_id, &text),
            Ok(Message::Binary(bytes)) => {
                // Some clients send JSON in binary frames; non-UTF-8 content
                // fails parsing and is reported like any malformed payload.
                let text = String::from_utf8_lossy(&bytes);
                relay.handle_message(client_id, &text);
            }
            Ok(Message::Close(_)) => break,
            // Ping/Pong are answered at the protocol level.
            Ok(_) => {}
            Err(err) => {
                tracing::warn!("WebSocket error for client {}: {}", client_id, err);
                break;
            }
        }
    }

    relay.disconnect(client_id);
    // Unregistering dropped the channel sender; wait for the writer to flush
    // what was already queued.
    let _ = writer.await;
}
