//! Records exchanged with the BLE bridge module over UART
//!
//! The radio runs on a separate module; it forwards link state and raw GATT
//! writes, and sends our notifications to the subscriber. Each record:
//!
//! ```text
//! ┌──────┬─────┬──────┬─────────────┬──────────┐
//! │ 0xAA │ LEN │ KIND │ PAYLOAD     │ CHECKSUM │
//! └──────┴─────┴──────┴─────────────┴──────────┘
//! ```
//!
//! LEN is the payload length, CHECKSUM the XOR of LEN, KIND and payload.

use heapless::Vec;

/// Record synchronization byte
pub const RECORD_START: u8 = 0xAA;

/// Largest payload a record carries (one GATT write)
pub const MAX_RECORD_PAYLOAD: usize = 250;

/// Largest encoded record
pub const MAX_RECORD_LEN: usize = MAX_RECORD_PAYLOAD + 4;

/// Record kinds
pub mod kind {
    /// Bridge → watch: one GATT write (a packet fragment)
    pub const FRAGMENT: u8 = 0x01;
    /// Bridge → watch: central connected
    pub const CONNECTED: u8 = 0x02;
    /// Bridge → watch: central disconnected
    pub const DISCONNECTED: u8 = 0x03;
    /// Bridge → watch: central enabled notifications
    pub const SUBSCRIBED: u8 = 0x04;
    /// Watch → bridge: notify the subscriber
    pub const NOTIFY: u8 = 0x81;
}

/// Bridge link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Declared payload longer than [`MAX_RECORD_PAYLOAD`]
    TooLong,
    /// Checksum mismatch
    BadChecksum,
    /// Valid record of a kind we do not handle
    UnknownKind(u8),
    /// Output buffer too small
    BufferTooSmall,
}

/// Inbound record
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkRecord {
    Fragment(Vec<u8, MAX_RECORD_PAYLOAD>),
    Connected,
    Disconnected,
    Subscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Sync,
    Length,
    Kind,
    Payload,
    Checksum,
}

/// Byte-wise record parser
#[derive(Debug, Clone)]
pub struct BridgeParser {
    state: ParseState,
    len: u8,
    kind: u8,
    payload: Vec<u8, MAX_RECORD_PAYLOAD>,
}

impl Default for BridgeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::Sync,
            len: 0,
            kind: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial record and wait for the next start byte
    pub fn reset(&mut self) {
        self.state = ParseState::Sync;
        self.len = 0;
        self.kind = 0;
        self.payload.clear();
    }

    /// Feed one byte
    ///
    /// Returns a record when one completes. After an error the parser is
    /// back to hunting for a start byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<LinkRecord>, BridgeError> {
        match self.state {
            ParseState::Sync => {
                if byte == RECORD_START {
                    self.state = ParseState::Length;
                }
            }
            ParseState::Length => {
                if usize::from(byte) > MAX_RECORD_PAYLOAD {
                    self.reset();
                    return Err(BridgeError::TooLong);
                }
                self.len = byte;
                self.state = ParseState::Kind;
            }
            ParseState::Kind => {
                self.kind = byte;
                self.payload.clear();
                self.state = if self.len == 0 {
                    ParseState::Checksum
                } else {
                    ParseState::Payload
                };
            }
            ParseState::Payload => {
                // Length was checked against capacity
                let _ = self.payload.push(byte);
                if self.payload.len() == usize::from(self.len) {
                    self.state = ParseState::Checksum;
                }
            }
            ParseState::Checksum => {
                let expected = checksum(self.len, self.kind, &self.payload);
                let result = if byte == expected {
                    self.record().map(Some)
                } else {
                    Err(BridgeError::BadChecksum)
                };
                self.reset();
                return result;
            }
        }
        Ok(None)
    }

    fn record(&mut self) -> Result<LinkRecord, BridgeError> {
        match self.kind {
            kind::FRAGMENT => Ok(LinkRecord::Fragment(core::mem::take(&mut self.payload))),
            kind::CONNECTED => Ok(LinkRecord::Connected),
            kind::DISCONNECTED => Ok(LinkRecord::Disconnected),
            kind::SUBSCRIBED => Ok(LinkRecord::Subscribed),
            other => Err(BridgeError::UnknownKind(other)),
        }
    }
}

fn checksum(len: u8, kind: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(len ^ kind, |acc, &b| acc ^ b)
}

/// Encode a record into `out`, returning its length
pub fn encode_record(kind: u8, payload: &[u8], out: &mut [u8]) -> Result<usize, BridgeError> {
    if payload.len() > MAX_RECORD_PAYLOAD {
        return Err(BridgeError::TooLong);
    }
    let total = payload.len() + 4;
    if out.len() < total {
        return Err(BridgeError::BufferTooSmall);
    }

    let len = payload.len() as u8;
    out[0] = RECORD_START;
    out[1] = len;
    out[2] = kind;
    out[3..3 + payload.len()].copy_from_slice(payload);
    out[total - 1] = checksum(len, kind, payload);
    Ok(total)
}

/// Encode a notification for the subscriber
pub fn encode_notify(payload: &[u8], out: &mut [u8]) -> Result<usize, BridgeError> {
    encode_record(kind::NOTIFY, payload, out)
}
