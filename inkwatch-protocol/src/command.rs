//! Command decoding
//!
//! Payload layouts (offsets within the payload, byte 0 is the command code):
//!
//! ```text
//! 0x72 notification  [0x72][icon][state][text ...]
//! 0x71 find          [0x71]
//! 0x93 time sync     [0x93][..][..][yr_hi][yr_lo][month][day][hour][min][sec]
//! 0x73 alarm         [0x73][...]
//! ```
//!
//! The two layouts differ on purpose. Notifications pack icon and state
//! right after the command code, while time sync leaves two reserved bytes
//! before the year. Both match what the companion app sends.

use chrono::NaiveDateTime;
use heapless::String;

use crate::accumulator::Message;
use crate::calendar::CalendarFields;

// Inbound command codes
pub const CMD_FIND: u8 = 0x71;
pub const CMD_NOTIFICATION: u8 = 0x72;
pub const CMD_ALARM: u8 = 0x73;
pub const CMD_TIME_SYNC: u8 = 0x93;

/// Maximum notification text kept from one message (bytes)
pub const MAX_TEXT_LEN: usize = 256;

/// Icon code of an incoming-call notification
pub const ICON_CALL: u8 = 1;
/// Icon code of a call-cancel notification
pub const ICON_CALL_CANCEL: u8 = 2;

const NOTIFICATION_TEXT_OFFSET: usize = 3;
const TIME_SYNC_LEN: usize = 10;

/// Decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Command code not understood by the watch
    UnknownCommand(u8),
    /// Payload shorter than the command's fixed fields
    Truncated,
    /// Time-sync fields do not form a representable date
    InvalidTime,
}

/// A pushed notification
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    pub icon: u8,
    pub state: u8,
    pub text: String<MAX_TEXT_LEN>,
}

impl Notification {
    /// Build a notification from raw text bytes
    ///
    /// Invalid UTF-8 is replaced by one `?` per offending byte and text
    /// beyond [`MAX_TEXT_LEN`] is cut at a character boundary.
    pub fn from_bytes(icon: u8, state: u8, bytes: &[u8]) -> Self {
        let mut text = String::new();
        'outer: for chunk in bytes.utf8_chunks() {
            for ch in chunk.valid().chars() {
                if text.push(ch).is_err() {
                    break 'outer;
                }
            }
            for _ in chunk.invalid() {
                if text.push('?').is_err() {
                    break 'outer;
                }
            }
        }
        Self { icon, state, text }
    }

    /// Incoming call
    pub fn is_call(&self) -> bool {
        self.icon == ICON_CALL
    }

    /// Call was cancelled or answered elsewhere
    pub fn is_call_cancel(&self) -> bool {
        self.icon == ICON_CALL_CANCEL
    }
}

/// A decoded inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Notification(Notification),
    Find,
    TimeSync(NaiveDateTime),
    /// Recognized but not acted on
    Alarm,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Command {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Command::Notification(n) => defmt::write!(f, "Notification({})", n),
            Command::Find => defmt::write!(f, "Find"),
            Command::TimeSync(t) => defmt::write!(f, "TimeSync({})", defmt::Debug2Format(t)),
            Command::Alarm => defmt::write!(f, "Alarm"),
        }
    }
}

/// Decode a complete message into a command
pub fn decode(message: &Message) -> Result<Command, DecodeError> {
    let payload = message.payload();
    let code = *payload.first().ok_or(DecodeError::Truncated)?;

    match code {
        CMD_NOTIFICATION => {
            if payload.len() < NOTIFICATION_TEXT_OFFSET {
                return Err(DecodeError::Truncated);
            }
            Ok(Command::Notification(Notification::from_bytes(
                payload[1],
                payload[2],
                &payload[NOTIFICATION_TEXT_OFFSET..],
            )))
        }
        CMD_FIND => Ok(Command::Find),
        CMD_TIME_SYNC => {
            if payload.len() < TIME_SYNC_LEN {
                return Err(DecodeError::Truncated);
            }
            let fields = CalendarFields {
                year: u16::from_be_bytes([payload[3], payload[4]]),
                month: payload[5],
                day: payload[6],
                hour: payload[7],
                minute: payload[8],
                second: payload[9],
            };
            fields
                .normalize()
                .map(Command::TimeSync)
                .ok_or(DecodeError::InvalidTime)
        }
        CMD_ALARM => Ok(Command::Alarm),
        other => Err(DecodeError::UnknownCommand(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catenation;
    use chrono::{Datelike, Timelike};

    fn message(payload: &[u8]) -> Message {
        Message::new(Catenation::A, payload).unwrap()
    }

    #[test]
    fn test_decode_notification() {
        let cmd = decode(&message(&[0x72, 0x01, 0x00, b'H', b'i'])).unwrap();
        match cmd {
            Command::Notification(n) => {
                assert_eq!(n.icon, 1);
                assert_eq!(n.state, 0);
                assert_eq!(n.text.as_str(), "Hi");
                assert!(n.is_call());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_notification_text() {
        let cmd = decode(&message(&[0x72, 0x05, 0x01])).unwrap();
        assert_eq!(
            cmd,
            Command::Notification(Notification::from_bytes(5, 1, b""))
        );
    }

    #[test]
    fn test_notification_truncated() {
        assert_eq!(decode(&message(&[0x72, 0x01])), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let n = Notification::from_bytes(3, 0, &[b'a', 0xFF, 0xFE, b'b']);
        assert_eq!(n.text.as_str(), "a??b");
    }

    #[test]
    fn test_long_text_is_cut() {
        let long = [b'x'; MAX_TEXT_LEN + 20];
        let n = Notification::from_bytes(3, 0, &long);
        assert_eq!(n.text.len(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_decode_find_and_alarm() {
        assert_eq!(decode(&message(&[0x71])), Ok(Command::Find));
        assert_eq!(decode(&message(&[0x73, 0x00, 0x07])), Ok(Command::Alarm));
    }

    #[test]
    fn test_decode_time_sync() {
        // 2024-02-29 23:59:60 normalizes to 2024-03-01 00:00:00
        let payload = [0x93, 0x00, 0x00, 0x07, 0xE8, 2, 29, 23, 59, 60];
        match decode(&message(&payload)).unwrap() {
            Command::TimeSync(t) => {
                assert_eq!((t.year(), t.month(), t.day()), (2024, 3, 1));
                assert_eq!((t.hour(), t.minute(), t.second()), (0, 0, 0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_time_sync_truncated() {
        let payload = [0x93, 0x00, 0x00, 0x07, 0xE8, 2, 29];
        assert_eq!(decode(&message(&payload)), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_layouts_use_different_offsets() {
        // Same body bytes after the command code
        let body = [0x00, 0x00, 0x07, 0xE8, 1, 2, 3, 4, 5];

        let mut notification = std::vec![CMD_NOTIFICATION];
        notification.extend_from_slice(&body);
        match decode(&message(&notification)).unwrap() {
            Command::Notification(n) => {
                assert_eq!((n.icon, n.state), (0x00, 0x00));
                assert_eq!(n.text.as_bytes()[..2], [0x07, b'?']);
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut time_sync = std::vec![CMD_TIME_SYNC];
        time_sync.extend_from_slice(&body);
        match decode(&message(&time_sync)).unwrap() {
            Command::TimeSync(t) => assert_eq!((t.year(), t.month(), t.day()), (2024, 1, 2)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            decode(&message(&[0x42, 0x00])),
            Err(DecodeError::UnknownCommand(0x42))
        );
        assert_eq!(decode(&message(&[])), Err(DecodeError::Truncated));
    }
}
