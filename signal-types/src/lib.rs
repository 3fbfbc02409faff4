//! # signal-types
//!
//! Wire format types for the FileDrop signaling protocol.
//!
//! This crate provides the types shared by the relay server and its clients:
//! - [`ClientId`], [`ShareCode`] - Identity and rendezvous types
//! - [`ClientMessage`] - Commands a client sends over its connection
//! - [`ServerMessage`] - Events the relay sends back
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod messages;

pub use error::WireError;
pub use ids::{ClientId, ShareCode};
pub use messages::{ClientMessage, ServerMessage, SignalPayload};
