//! Identity and rendezvous types for FileDrop signaling.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::WireError;

/// A unique identifier for a connected client.
///
/// 8 bytes of random data, displayed as 16 lowercase hex characters.
/// Assigned by the relay at accept time and never reused while the
/// connection is live.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId([u8; 8]);

impl ClientId {
    /// Create a new random ClientId.
    pub fn random() -> Self {
        let mut bytes = [0u8; 8];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(bytes)
    }

    /// Create a ClientId from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == 8 {
            let mut arr = [0u8; 8];
            arr.copy_from_slice(bytes);
            Some(Self(arr))
        } else {
            None
        }
    }

    /// Get the raw bytes of this ClientId.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self)
    }
}

impl FromStr for ClientId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| WireError::InvalidId(s.to_string()))?;
        Self::from_bytes(&bytes).ok_or_else(|| WireError::InvalidId(s.to_string()))
    }
}

// Client IDs travel over the wire as hex strings, not byte arrays.
impl Serialize for ClientId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Alphabet for share codes: uppercase alphanumeric, easy to read aloud.
const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a share code in characters.
const CODE_LEN: usize = 6;

/// A human-typeable room code.
///
/// 6 uppercase alphanumeric characters, shared out of band between the
/// two peers. Unique among currently-open rooms; codes may recur once
/// the room that held them is closed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareCode([u8; CODE_LEN]);

impl ShareCode {
    /// Create a new random ShareCode.
    pub fn random() -> Self {
        // 252 is the largest multiple of 36 that fits in a byte; bytes past
        // it are redrawn so every alphabet symbol is equally likely.
        const LIMIT: u8 = 252;

        let mut code = [0u8; CODE_LEN];
        let mut filled = 0;
        while filled < CODE_LEN {
            let mut buf = [0u8; 16];
            getrandom::getrandom(&mut buf).expect("getrandom failed");
            for byte in buf {
                if filled == CODE_LEN {
                    break;
                }
                if byte < LIMIT {
                    code[filled] = CODE_ALPHABET[(byte % 36) as usize];
                    filled += 1;
                }
            }
        }
        Self(code)
    }

    /// View the code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("share codes are ASCII")
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareCode({})", self)
    }
}

impl FromStr for ShareCode {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != CODE_LEN
            || !bytes
                .iter()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(WireError::InvalidId(s.to_string()));
        }
        let mut arr = [0u8; CODE_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

impl Serialize for ShareCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShareCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
