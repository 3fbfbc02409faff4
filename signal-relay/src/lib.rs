//! # signal-relay
//!
//! WebSocket signaling relay for FileDrop peer-to-peer transfers.
//!
//! This crate implements a rendezvous server that:
//! - Accepts WebSocket connections from browsers
//! - Pairs exactly two peers per room via a short share code
//! - Forwards opaque session-negotiation messages between them
//! - Never sees file bytes (the relay is pure rendezvous plus forwarding)
//!
//! ## Architecture
//!
//! ```text
//! Sender ────┐                    ┌──── Receiver
//!            │     WebSocket      │
//!            ├───────────────────►│
//!            │                    │
//!        ┌───┴────────────────────┴───┐
//!        │       signal-relay         │
//!        │  ┌──────────┐ ┌─────────┐  │
//!        │  │ registry │ │  rooms  │  │
//!        │  └──────────┘ └─────────┘  │
//!        └────────────────────────────┘
//! ```
//!
//! ## Protocol
//!
//! Frames are flat JSON objects with a `type` discriminator:
//! - `create_room` → `room_created` (open a room, get a share code)
//! - `join_room` → `room_joined` / `peer_joined` (rendezvous)
//! - `offer` / `answer` / `candidate` (relayed to the other occupant)
//! - `peer_left` (server → client, the other occupant disconnected)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod server;
pub mod session;
