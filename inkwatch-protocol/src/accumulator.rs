//! Fragment reassembly
//!
//! The transport delivers messages in MTU-sized fragments. The first
//! fragment of a message starts with a [`Header`]; every following fragment
//! starts with one sequence byte we skip, then carries message bytes.
//!
//! The accumulator is a two-state machine (idle / accumulating) fed one
//! fragment at a time from the transport's receive context.

use heapless::Vec;

use crate::header::{Header, HEADER_LEN};

/// Maximum complete message size (header + payload)
pub const MAX_MESSAGE_LEN: usize = 512;

/// Errors reported while reassembling fragments
///
/// None of these are fatal: the accumulator is back in a consistent state
/// when it returns one, and the caller only needs to log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Zero-length fragment
    Empty,
    /// Continuation fragment with no message in progress
    OrphanFragment,
    /// Declared message length exceeds [`MAX_MESSAGE_LEN`]
    TooLong,
}

/// A complete, reassembled protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: Header,
    bytes: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Message {
    /// Build a message from a header mode and payload (used for replies and tests)
    pub fn new(catenation: crate::Catenation, payload: &[u8]) -> Result<Self, FrameError> {
        if HEADER_LEN + payload.len() > MAX_MESSAGE_LEN {
            return Err(FrameError::TooLong);
        }
        let header = Header::for_payload(catenation, payload.len());
        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(&header.encode())
            .map_err(|_| FrameError::TooLong)?;
        bytes
            .extend_from_slice(payload)
            .map_err(|_| FrameError::TooLong)?;
        Ok(Self { header, bytes })
    }

    /// The parsed header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Payload bytes (command code first)
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    /// Command code, if the payload is not empty
    pub fn command(&self) -> Option<u8> {
        self.payload().first().copied()
    }

    /// Whole message including the header
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No partial message
    Idle,
    /// Header seen, waiting for continuation fragments
    Accumulating,
}

/// Reassembles transport fragments into [`Message`]s
#[derive(Debug, Clone)]
pub struct Accumulator {
    state: State,
    header: Option<Header>,
    buffer: Vec<u8, MAX_MESSAGE_LEN>,
    expected_len: usize,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    /// Create an idle accumulator
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            header: None,
            buffer: Vec::new(),
            expected_len: 0,
        }
    }

    /// Drop any partial message and return to idle
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.header = None;
        self.buffer.clear();
        self.expected_len = 0;
    }

    /// Whether a partial message is being held
    pub fn is_accumulating(&self) -> bool {
        self.state == State::Accumulating
    }

    /// Bytes received so far for the message in progress
    pub fn received_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total length of the message in progress (0 when idle)
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Feed one transport fragment
    ///
    /// Returns `Ok(Some(message))` when the fragment completes a message,
    /// `Ok(None)` when more fragments are needed.
    pub fn accumulate(&mut self, fragment: &[u8]) -> Result<Option<Message>, FrameError> {
        if fragment.is_empty() {
            return Err(FrameError::Empty);
        }

        if let Some(header) = Header::parse(fragment) {
            // A new header always wins over a stale partial message
            self.reset();
            return self.start(header, fragment);
        }

        match self.state {
            State::Idle => Err(FrameError::OrphanFragment),
            State::Accumulating => self.append(&fragment[1..]),
        }
    }

    fn start(&mut self, header: Header, fragment: &[u8]) -> Result<Option<Message>, FrameError> {
        let expected = header.message_len();
        if expected > MAX_MESSAGE_LEN {
            return Err(FrameError::TooLong);
        }

        self.header = Some(header);
        self.expected_len = expected;
        self.append(fragment)
    }

    /// Keep every received byte up to buffer capacity
    fn append(&mut self, data: &[u8]) -> Result<Option<Message>, FrameError> {
        let room = self.buffer.capacity() - self.buffer.len();
        let take = data.len().min(room);
        // Cannot fail, `take` fits the remaining capacity
        let _ = self.buffer.extend_from_slice(&data[..take]);

        if self.buffer.len() >= self.expected_len {
            return Ok(self.finish());
        }
        self.state = State::Accumulating;
        Ok(None)
    }

    fn finish(&mut self) -> Option<Message> {
        let header = self.header.take()?;
        let bytes = core::mem::take(&mut self.buffer);
        self.reset();
        Some(Message { header, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catenation;

    const HI_NOTIFICATION: [u8; 9] = [0xAB, 0x00, 0x05, 0xFF, 0x72, 0x01, 0x00, b'H', b'i'];

    /// Split a message after `first` bytes; remaining bytes travel in
    /// continuation fragments of `chunk` bytes, each prefixed with a sequence byte.
    fn fragments(message: &[u8], first: usize, chunk: usize) -> std::vec::Vec<std::vec::Vec<u8>> {
        let mut out = std::vec![message[..first].to_vec()];
        for (seq, part) in message[first..].chunks(chunk).enumerate() {
            let mut frag = std::vec![(seq % 0x80) as u8];
            frag.extend_from_slice(part);
            out.push(frag);
        }
        out
    }

    fn feed_all(acc: &mut Accumulator, frags: &[std::vec::Vec<u8>]) -> std::vec::Vec<Message> {
        frags
            .iter()
            .filter_map(|f| acc.accumulate(f).ok().flatten())
            .collect()
    }

    #[test]
    fn test_single_fragment_message() {
        let mut acc = Accumulator::new();
        let msg = acc.accumulate(&HI_NOTIFICATION).unwrap().unwrap();
        assert_eq!(msg.payload(), &HI_NOTIFICATION[4..]);
        assert_eq!(msg.command(), Some(0x72));
        assert!(!acc.is_accumulating());
    }

    #[test]
    fn test_two_fragments() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.accumulate(&HI_NOTIFICATION[..7]), Ok(None));
        assert!(acc.is_accumulating());
        assert_eq!(acc.received_len(), 7);
        assert_eq!(acc.expected_len(), 8);

        let msg = acc.accumulate(&[0x00, b'H', b'i']).unwrap().unwrap();
        assert_eq!(msg.as_bytes(), &HI_NOTIFICATION);
        assert!(!acc.is_accumulating());
    }

    #[test]
    fn test_every_split_offset() {
        let payload: std::vec::Vec<u8> = (0..40u8).map(|b| b.wrapping_mul(7)).collect();
        let message = Message::new(Catenation::A, &payload).unwrap();
        let bytes = message.as_bytes();

        for first in 4..=bytes.len() {
            for chunk in 1..=8 {
                let mut acc = Accumulator::new();
                let msgs = feed_all(&mut acc, &fragments(bytes, first, chunk));
                assert_eq!(msgs.len(), 1, "first={} chunk={}", first, chunk);
                assert_eq!(msgs[0].payload(), &payload[..]);
            }
        }
    }

    #[test]
    fn test_orphan_fragment_is_dropped() {
        let mut acc = Accumulator::new();
        assert_eq!(
            acc.accumulate(&[0x01, 0x02, 0x03]),
            Err(FrameError::OrphanFragment)
        );
        assert!(!acc.is_accumulating());

        // State is still usable afterwards
        assert!(acc.accumulate(&HI_NOTIFICATION).unwrap().is_some());
    }

    #[test]
    fn test_empty_fragment() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.accumulate(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn test_new_header_discards_partial() {
        let mut acc = Accumulator::new();
        acc.accumulate(&[0xAB, 0x00, 0x20, 0xFF, 0x72]).unwrap();
        assert!(acc.is_accumulating());

        let msg = acc.accumulate(&HI_NOTIFICATION).unwrap().unwrap();
        assert_eq!(msg.payload(), &HI_NOTIFICATION[4..]);
        assert!(!acc.is_accumulating());
    }

    #[test]
    fn test_too_long_is_rejected() {
        let mut acc = Accumulator::new();
        assert_eq!(
            acc.accumulate(&[0xAB, 0xFF, 0xFF, 0xFF, 0x72]),
            Err(FrameError::TooLong)
        );
        assert!(!acc.is_accumulating());
        assert_eq!(acc.accumulate(&[0x00, 0x01]), Err(FrameError::OrphanFragment));
    }

    #[test]
    fn test_trailing_bytes_are_kept() {
        let mut acc = Accumulator::new();
        acc.accumulate(&HI_NOTIFICATION[..6]).unwrap();
        let msg = acc
            .accumulate(&[0x00, 0x00, b'H', b'i', b'!', b'!'])
            .unwrap()
            .unwrap();
        assert_eq!(msg.as_bytes().len(), 11);
        assert_eq!(&msg.payload()[3..], b"Hi!!");
    }

    #[test]
    fn test_outbound_frames_reassemble() {
        let mut acc = Accumulator::new();

        let battery = crate::battery_report(50, false);
        let msg = acc.accumulate(&battery).unwrap().unwrap();
        assert_eq!(msg.as_bytes(), &battery);
        assert!(!acc.is_accumulating());

        let info = crate::info_report();
        let msg = acc.accumulate(&info).unwrap().unwrap();
        assert_eq!(msg.as_bytes(), &info);
        assert!(!acc.is_accumulating());

        // Back-to-back find requests each complete on their own
        let find = [0xAB, 0x00, 0x04, 0xFF, 0x71, 0x80, 0x00];
        for _ in 0..2 {
            let msg = acc.accumulate(&find).unwrap().unwrap();
            assert_eq!(msg.payload(), &[0x71, 0x80, 0x00]);
            assert!(!acc.is_accumulating());
        }
    }

    #[test]
    fn test_oversized_fragment_is_capped() {
        let mut acc = Accumulator::new();
        let mut frag = std::vec![0xAB, 0x00, 0x04, 0xFF, 0x71, 0x80, 0x00];
        frag.resize(MAX_MESSAGE_LEN + 20, 0x55);
        let msg = acc.accumulate(&frag).unwrap().unwrap();
        assert_eq!(msg.as_bytes().len(), MAX_MESSAGE_LEN);
        assert_eq!(msg.command(), Some(0x71));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reassembly_is_split_independent(
                payload in proptest::collection::vec(any::<u8>(), 1..300),
                first_extra in 0usize..300,
                chunk in 1usize..64,
            ) {
                let message = Message::new(Catenation::B, &payload).unwrap();
                let bytes = message.as_bytes();
                let first = (4 + first_extra).min(bytes.len());

                let mut acc = Accumulator::new();
                let msgs = feed_all(&mut acc, &fragments(bytes, first, chunk));

                prop_assert_eq!(msgs.len(), 1);
                prop_assert_eq!(msgs[0].payload(), &payload[..]);
                prop_assert!(!acc.is_accumulating());
            }
        }
    }
}
