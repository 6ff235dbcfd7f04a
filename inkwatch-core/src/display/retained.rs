//! State kept across warm resets
//!
//! Packed into four 32-bit words so it fits scratch registers that survive
//! a watchdog reboot:
//!
//! ```text
//! word 0: magic
//! word 1: boot time (seconds)
//! word 2: [unused:8][day:8][hour:8][minute:8]   0xFF = unknown
//! word 3: connected flag
//! ```

/// Marks the words as written by this firmware ("IWRS")
pub const RETAINED_MAGIC: u32 = 0x4957_5253;

const UNKNOWN: u32 = 0xFF;

/// Snapshot restored after a warm reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetainedState {
    pub boot_time_s: u32,
    pub prev_day: Option<u8>,
    pub prev_hour: Option<u8>,
    pub prev_minute: Option<u8>,
    pub prev_connected: bool,
}

fn pack_field(value: Option<u8>) -> u32 {
    value.map_or(UNKNOWN, u32::from)
}

fn unpack_field(word: u32, shift: u32) -> Option<u8> {
    let value = (word >> shift) & 0xFF;
    (value != UNKNOWN).then_some(value as u8)
}

impl RetainedState {
    /// Pack into scratch words
    pub fn to_words(&self) -> [u32; 4] {
        [
            RETAINED_MAGIC,
            self.boot_time_s,
            pack_field(self.prev_day) << 16
                | pack_field(self.prev_hour) << 8
                | pack_field(self.prev_minute),
            u32::from(self.prev_connected),
        ]
    }

    /// Unpack scratch words; `None` after a cold boot
    pub fn from_words(words: [u32; 4]) -> Option<Self> {
        if words[0] != RETAINED_MAGIC {
            return None;
        }
        Some(Self {
            boot_time_s: words[1],
            prev_day: unpack_field(words[2], 16),
            prev_hour: unpack_field(words[2], 8),
            prev_minute: unpack_field(words[2], 0),
            prev_connected: words[3] != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_layout() {
        let state = RetainedState {
            boot_time_s: 1_700_000_000,
            prev_day: Some(31),
            prev_hour: Some(23),
            prev_minute: None,
            prev_connected: true,
        };
        let words = state.to_words();
        assert_eq!(words[0], RETAINED_MAGIC);
        assert_eq!(words[2], 0x001F_17FF);
        assert_eq!(RetainedState::from_words(words), Some(state));
    }

    #[test]
    fn test_cold_boot_has_no_state() {
        assert_eq!(RetainedState::from_words([0; 4]), None);
        assert_eq!(
            RetainedState::from_words([0xDEAD_BEEF, 1, 2, 3]),
            None
        );
    }
}
