//! Battery log block ring
//!
//! Persisted log blocks use slot indices 0..=99 that wrap. Only the most
//! recent [`LOG_RETENTION`] blocks are kept: every append past that point
//! names the slot to delete.

/// Number of slot indices before wrapping
pub const LOG_SLOTS: u8 = 100;

/// Blocks kept in flash
pub const LOG_RETENTION: u8 = 10;

/// Where to write the next block and what to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockSlot {
    pub write: u8,
    pub delete: Option<u8>,
}

/// Slot allocator for persisted log blocks
#[derive(Debug, Clone, Default)]
pub struct BlockRing {
    next: u8,
    /// Blocks believed to be in flash, saturating at [`LOG_SLOTS`]
    stored: u8,
}

impl BlockRing {
    /// Empty ring starting at slot 0
    pub const fn new() -> Self {
        Self { next: 0, stored: 0 }
    }

    /// Rebuild the ring from the slots already present in flash
    ///
    /// The next slot is the one after the newest block, i.e. the present
    /// slot whose successor is absent.
    pub fn resume(existing: impl IntoIterator<Item = u8>) -> Self {
        let mut present = [false; LOG_SLOTS as usize];
        for slot in existing {
            if slot < LOG_SLOTS {
                present[slot as usize] = true;
            }
        }

        let stored = present.iter().filter(|&&p| p).count() as u8;
        let next = (0..LOG_SLOTS)
            .find(|&i| present[i as usize] && !present[((i + 1) % LOG_SLOTS) as usize])
            .map_or(0, |newest| (newest + 1) % LOG_SLOTS);

        Self { next, stored }
    }

    /// Allocate the slot for a new block
    pub fn append(&mut self) -> BlockSlot {
        let write = self.next;
        self.next = (self.next + 1) % LOG_SLOTS;
        self.stored = self.stored.saturating_add(1).min(LOG_SLOTS);

        let delete = (self.stored > LOG_RETENTION)
            .then_some((write + LOG_SLOTS - LOG_RETENTION) % LOG_SLOTS);

        BlockSlot { write, delete }
    }

    /// Slot the next block will be written to
    pub fn next_slot(&self) -> u8 {
        self.next
    }
}
