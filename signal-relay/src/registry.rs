//! Connection registry.
//!
//! Owns the write half of every live connection. Each connection is assigned
//! an opaque [`ClientId`] at accept time; nothing else in the relay may reach
//! a connection except through that ID.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use signal_types::ClientId;
use tokio::sync::mpsc;

/// Sender half of a connection's outbound channel.
///
/// The session's writer task drains the receiving end into the socket.
pub type ConnectionSender = mpsc::UnboundedSender<String>;

/// Registry of live connections, keyed by [`ClientId`].
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ClientId, ConnectionSender>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection and assign it a fresh ID.
    ///
    /// IDs come from the OS CSPRNG; the (negligible-probability) collision
    /// with a live connection is drawn again, so an ID is never reused while
    /// any room might still reference it.
    pub fn register(&self, tx: ConnectionSender) -> ClientId {
        loop {
            let id = ClientId::random();
            match self.connections.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert(tx);
                    return id;
                }
                Entry::Occupied(_) => continue,
            }
        }
    }

    /// Remove a connection.
    ///
    /// Called exactly once, from the session's terminal path, before room
    /// cleanup runs.
    pub fn unregister(&self, id: &ClientId) {
        self.connections.remove(id);
    }

    /// Whether the connection is registered with an open channel.
    pub fn is_open(&self, id: &ClientId) -> bool {
        self.connections
            .get(id)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Write a text frame to a connection.
    ///
    /// This is the only write path. Returns `false` when the ID is unknown
    /// or the channel has closed; callers treat that the same as "peer not
    /// available".
    pub fn send(&self, id: &ClientId, frame: impl Into<String>) -> bool {
        match self.connections.get(id) {
            Some(tx) => tx.send(frame.into()).is_ok(),
            None => false,
        }
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether any connections are live.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
