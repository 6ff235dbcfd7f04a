//! Message header recognition
//!
//! Header format:
//! - MARKER0 (1 byte): 0xAB or 0xEA, selects the catenation mode
//! - LENGTH (2 bytes): big-endian, total message length minus three
//! - MARKER3 (1 byte): 0xFE or 0xFF
//!
//! The length field counts the payload plus one header byte, so a message
//! with an `n` byte payload carries `n + 1`.

/// Start marker for catenation mode A
pub const MARKER_START_A: u8 = 0xAB;

/// Start marker for catenation mode B
pub const MARKER_START_B: u8 = 0xEA;

/// End-of-header marker variants
pub const MARKER_END_A: u8 = 0xFE;
pub const MARKER_END_B: u8 = 0xFF;

/// Header size in bytes
pub const HEADER_LEN: usize = 4;

/// Catenation mode announced by the first header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Catenation {
    /// 0xAB
    A,
    /// 0xEA
    B,
}

impl Catenation {
    /// Parse the catenation mode from a start marker
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            MARKER_START_A => Some(Catenation::A),
            MARKER_START_B => Some(Catenation::B),
            _ => None,
        }
    }

    /// Wire marker for this mode
    pub fn marker(self) -> u8 {
        match self {
            Catenation::A => MARKER_START_A,
            Catenation::B => MARKER_START_B,
        }
    }
}

/// A recognized message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    /// Catenation mode
    pub catenation: Catenation,
    /// Length field (total message bytes minus three)
    pub length: u16,
}

impl Header {
    /// Try to recognize a header at the start of `bytes`
    ///
    /// Returns `None` when fewer than four bytes are present or either
    /// marker is not one of the known values.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let catenation = Catenation::from_marker(bytes[0])?;
        if bytes[3] != MARKER_END_A && bytes[3] != MARKER_END_B {
            return None;
        }
        Some(Self {
            catenation,
            length: u16::from_be_bytes([bytes[1], bytes[2]]),
        })
    }

    /// Total message length (header + payload)
    pub fn message_len(&self) -> usize {
        self.length as usize + HEADER_LEN - 1
    }

    /// Header for a message carrying `payload_len` payload bytes
    pub fn for_payload(catenation: Catenation, payload_len: usize) -> Self {
        Self {
            catenation,
            length: (payload_len + 1) as u16,
        }
    }

    /// Encode into a four byte header using the 0xFF end marker
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let [hi, lo] = self.length.to_be_bytes();
        [self.catenation.marker(), hi, lo, MARKER_END_B]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_markers() {
        let h = Header::parse(&[0xAB, 0x00, 0x05, 0xFF]).unwrap();
        assert_eq!(h.catenation, Catenation::A);
        assert_eq!(h.length, 5);
        assert_eq!(h.message_len(), 8);

        let h = Header::parse(&[0xEA, 0x01, 0x02, 0xFE, 0x72]).unwrap();
        assert_eq!(h.catenation, Catenation::B);
        assert_eq!(h.length, 0x0102);
        assert_eq!(h.message_len(), 0x0105);
    }

    #[test]
    fn test_rejects_unknown_markers() {
        assert!(Header::parse(&[0xAA, 0x00, 0x05, 0xFF]).is_none());
        assert!(Header::parse(&[0xAB, 0x00, 0x05, 0x00]).is_none());
    }

    #[test]
    fn test_rejects_short_input() {
        assert!(Header::parse(&[0xAB, 0x00, 0x05]).is_none());
        assert!(Header::parse(&[]).is_none());
    }

    #[test]
    fn test_encode() {
        let h = Header {
            catenation: Catenation::A,
            length: 0x0111,
        };
        assert_eq!(h.encode(), [0xAB, 0x01, 0x11, 0xFF]);
    }

    #[test]
    fn test_message_len_is_length_plus_three() {
        // Battery report: 8 bytes, length field 5
        let h = Header::parse(&[0xAB, 0x00, 0x05, 0xFF, 0x91]).unwrap();
        assert_eq!(h.message_len(), 8);

        // Find-phone request: 7 bytes, length field 4
        let h = Header::parse(&[0xAB, 0x00, 0x04, 0xFF, 0x71, 0x80, 0x00]).unwrap();
        assert_eq!(h.message_len(), 7);
    }

    #[test]
    fn test_for_payload() {
        let h = Header::for_payload(Catenation::B, 3);
        assert_eq!(h.length, 4);
        assert_eq!(h.message_len(), HEADER_LEN + 3);
    }
}
