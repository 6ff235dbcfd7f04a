//! Companion-App Wire Protocol
//!
//! This crate defines the binary protocol spoken between the phone companion
//! app and the watch. The transport (BLE GATT writes) hands us fragments no
//! larger than the negotiated MTU; we reassemble them into messages and
//! decode the handful of commands the watch understands.
//!
//! # Protocol Overview
//!
//! Every message starts with a fixed header:
//! ```text
//! ┌─────────┬────────┬────────┬─────────┬──────────────────────────┐
//! │ MARKER0 │ LEN_HI │ LEN_LO │ MARKER3 │ PAYLOAD (LEN bytes)      │
//! │ AB / EA │ 1B     │ 1B     │ FE / FF │ CMD │ command data ...   │
//! └─────────┴────────┴────────┴─────────┴──────────────────────────┘
//! ```
//!
//! Messages longer than one transport write continue in further fragments.
//! Each continuation fragment carries a leading sequence byte that is not
//! part of the message.
//!
//! [`bridge`] carries those fragments, plus link state, between the radio
//! module and the watch.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod accumulator;
pub mod bridge;
pub mod calendar;
pub mod command;
pub mod header;
pub mod outbound;

pub use accumulator::{Accumulator, FrameError, Message, MAX_MESSAGE_LEN};
pub use bridge::{
    encode_notify, BridgeError, BridgeParser, LinkRecord, MAX_RECORD_LEN, MAX_RECORD_PAYLOAD,
};
pub use calendar::CalendarFields;
pub use command::{decode, Command, DecodeError, Notification, MAX_TEXT_LEN};
pub use header::{Catenation, Header, HEADER_LEN};
pub use outbound::{battery_report, info_report, Version, FIRMWARE_VERSION};
