//! Main SignalRelay server coordination.
//!
//! SignalRelay owns the room table and coordinates rendezvous and message
//! relay between the two occupants of each room.

use crate::config::Config;
use crate::error::SignalError;
use crate::registry::{ConnectionRegistry, ConnectionSender};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use signal_types::{ClientId, ClientMessage, ServerMessage, ShareCode, SignalPayload, WireError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Operational metrics for monitoring relay activity.
///
/// All counters are monotonically increasing (reset only on restart).
/// Thread-safe via `AtomicU64` — no locks needed for incrementing.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total connections accepted.
    pub connections_total: AtomicU64,
    /// Total rooms created.
    pub rooms_created: AtomicU64,
    /// Total successful joins.
    pub joins_total: AtomicU64,
    /// Total signaling messages relayed between peers.
    pub messages_relayed: AtomicU64,
    /// Total command errors reported to senders.
    pub errors_total: AtomicU64,
}

/// The two role slots of a room.
///
/// The initiator created the room and offers content; the responder joined
/// by code. Either slot may be vacated by a disconnect, but a room never
/// survives with both slots empty.
#[derive(Debug, Default)]
struct Room {
    initiator: Option<ClientId>,
    responder: Option<ClientId>,
}

impl Room {
    fn is_empty(&self) -> bool {
        self.initiator.is_none() && self.responder.is_none()
    }

    /// The other occupant, if `id` occupies a slot; `Err` if it occupies
    /// neither.
    fn peer_of(&self, id: ClientId) -> Result<Option<ClientId>, SignalError> {
        if self.initiator == Some(id) {
            Ok(self.responder)
        } else if self.responder == Some(id) {
            Ok(self.initiator)
        } else {
            Err(SignalError::NotAParticipant)
        }
    }
}

/// Main relay server: connection registry plus room coordinator.
#[derive(Debug)]
pub struct SignalRelay {
    config: Config,
    registry: ConnectionRegistry,
    /// Operational metrics (counters).
    metrics: RelayMetrics,
    /// Open rooms keyed by share code. The DashMap entry API gives per-room
    /// locking, so slot check-and-fill and vacate-and-maybe-delete are
    /// atomic with respect to concurrent commands on the same room.
    rooms: DashMap<ShareCode, Room>,
}

impl SignalRelay {
    /// Create a new SignalRelay with the given config.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: ConnectionRegistry::new(),
            metrics: RelayMetrics::default(),
            rooms: DashMap::new(),
        }
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get access to the connection registry.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of currently-open rooms.
    pub fn open_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Bind the configured address and serve WebSocket and HTTP endpoints
    /// until shutdown.
    pub async fn serve(self: Arc<Self>) -> crate::error::Result<()> {
        let app = crate::http::build_router(self.clone());
        let addr = self.config.server.bind_address.clone();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Signaling relay listening on ws://{}/ws", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }

    /// Accept a new connection: register its outbound channel and assign an
    /// opaque ID.
    pub fn connect(&self, tx: ConnectionSender) -> ClientId {
        let id = self.registry.register(tx);
        self.metrics
            .connections_total
            .fetch_add(1, Ordering::Relaxed);
        tracing::info!("Client {} connected", id);
        id
    }

    /// Handle one raw text frame from `sender`.
    ///
    /// Every outcome, success or failure, is local: replies and relays go
    /// through the registry, and errors are reported only to the sender.
    pub fn handle_message(&self, sender: ClientId, text: &str) {
        let result = match ClientMessage::parse(text) {
            Ok(ClientMessage::CreateRoom) => {
                self.create_room(sender);
                Ok(())
            }
            Ok(ClientMessage::JoinRoom { share_code }) => {
                self.join_room(sender, share_code.as_deref())
            }
            Ok(ClientMessage::Offer(payload)) => self.relay_signal(sender, "offer", &payload),
            Ok(ClientMessage::Answer(payload)) => self.relay_signal(sender, "answer", &payload),
            Ok(ClientMessage::Candidate(payload)) => {
                self.relay_signal(sender, "candidate", &payload)
            }
            Err(WireError::UnknownType(message_type)) => {
                tracing::debug!("Unknown message type from {}: {}", sender, message_type);
                Err(SignalError::UnknownType(message_type))
            }
            Err(_) => Err(SignalError::InvalidFormat),
        };

        if let Err(err) = result {
            self.report_error(sender, &err);
        }
    }

    /// Open a fresh room with `sender` as initiator and reply with the code.
    ///
    /// Always succeeds: code generation retries until it finds a code not
    /// assigned to any open room.
    pub fn create_room(&self, sender: ClientId) -> ShareCode {
        let share_code = loop {
            let code = ShareCode::random();
            match self.rooms.entry(code) {
                Entry::Vacant(entry) => {
                    entry.insert(Room {
                        initiator: Some(sender),
                        responder: None,
                    });
                    break code;
                }
                Entry::Occupied(_) => continue,
            }
        };

        self.metrics.rooms_created.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Room {} created by initiator {}", share_code, sender);

        self.send_to(
            sender,
            &ServerMessage::RoomCreated {
                share_code,
                client_id: sender,
            },
        );
        share_code
    }

    /// Fill the responder slot of an open room.
    pub fn join_room(&self, sender: ClientId, code: Option<&str>) -> Result<(), SignalError> {
        let raw = code.filter(|c| !c.is_empty()).ok_or(SignalError::CodeMissing)?;
        // A code that cannot exist behaves like one that doesn't.
        let share_code: ShareCode = raw.parse().map_err(|_| SignalError::RoomNotFound)?;

        // Check-and-fill under the room's entry lock: concurrent joins racing
        // for the same slot see exactly one winner.
        let initiator = {
            let mut room = self
                .rooms
                .get_mut(&share_code)
                .ok_or(SignalError::RoomNotFound)?;
            if room.responder.is_some() {
                return Err(SignalError::RoomFull);
            }
            room.responder = Some(sender);
            room.initiator
        };

        // A room never outlives its last occupant, so an open responder slot
        // implies an initiator.
        let Some(initiator) = initiator else {
            return Err(SignalError::RoomNotFound);
        };

        self.metrics.joins_total.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            "Responder {} joined room {} with initiator {}",
            sender,
            share_code,
            initiator
        );

        self.send_to(
            initiator,
            &ServerMessage::PeerJoined {
                peer_id: sender,
                share_code,
            },
        );
        self.send_to(
            sender,
            &ServerMessage::RoomJoined {
                peer_id: initiator,
                client_id: sender,
                share_code,
            },
        );
        Ok(())
    }

    /// Forward an offer/answer/candidate to the other occupant of its room.
    ///
    /// The payload is never inspected; it is re-encoded field-for-field with
    /// `peerId` overwritten to the sender's connection ID. A relay command
    /// from a connection that occupies neither slot is rejected rather than
    /// guessed at.
    fn relay_signal(
        &self,
        sender: ClientId,
        kind: &'static str,
        payload: &SignalPayload,
    ) -> Result<(), SignalError> {
        let share_code: ShareCode = payload
            .share_code
            .as_deref()
            .and_then(|c| c.parse().ok())
            .ok_or(SignalError::RoomNotFoundForSignaling)?;

        let target = {
            let room = self
                .rooms
                .get(&share_code)
                .ok_or(SignalError::RoomNotFoundForSignaling)?;
            room.peer_of(sender)?
        };
        let target = target.ok_or(SignalError::PeerUnavailable)?;

        // The target may disconnect between the lookup and the write; a
        // failed registry send is the same outcome as an empty slot.
        if !self.registry.send(&target, payload.to_frame(kind, sender)) {
            tracing::debug!(
                "Failed to relay {}: target {} gone from room {}",
                kind,
                target,
                share_code
            );
            return Err(SignalError::PeerUnavailable);
        }

        self.metrics.messages_relayed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Relayed {} from {} to {} in room {}",
            kind,
            sender,
            target,
            share_code
        );
        Ok(())
    }

    /// Tear down a connection: unregister it, vacate any room slots it
    /// holds, notify the remaining occupant, and delete rooms left empty.
    ///
    /// Visits every open room exactly once. Invoked once per connection,
    /// after the transport has closed.
    pub fn disconnect(&self, id: ClientId) {
        self.registry.unregister(&id);
        tracing::info!("Client {} disconnected", id);

        // retain decides vacate-and-maybe-delete under each room's entry
        // lock, so an in-flight relay either sees the occupant or a closed
        // channel, never a dangling reference.
        self.rooms.retain(|code, room| {
            let held_initiator = room.initiator == Some(id);
            let held_responder = room.responder == Some(id);
            if held_initiator {
                room.initiator = None;
            }
            if held_responder {
                room.responder = None;
            }
            if !held_initiator && !held_responder {
                return true;
            }

            if room.is_empty() {
                tracing::info!("Room {} is empty and has been deleted", code);
                return false;
            }

            if let Some(peer) = room.initiator.or(room.responder) {
                tracing::info!("Client {} left room {}, notifying {}", id, code, peer);
                self.send_to(
                    peer,
                    &ServerMessage::PeerLeft {
                        peer_id: id,
                        share_code: *code,
                    },
                );
            }
            true
        });
    }

    /// Report a command failure to the sender.
    fn report_error(&self, sender: ClientId, err: &SignalError) {
        self.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Command from {} failed: {}", sender, err);
        self.send_to(
            sender,
            &ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }

    /// Write a server event to one connection through the registry.
    ///
    /// A failed write means the connection already closed; the event is
    /// dropped, never queued.
    fn send_to(&self, id: ClientId, msg: &ServerMessage) -> bool {
        let frame = match msg.to_json() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!("Failed to serialize {:?}: {}", msg, err);
                return false;
            }
        };

        let sent = self.registry.send(&id, frame);
        if !sent {
            tracing::debug!("Dropped event for closed connection {}", id);
        }
        sent
    }
}
