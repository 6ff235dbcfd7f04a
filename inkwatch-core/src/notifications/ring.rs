//! Fixed-capacity notification text store
//!
//! Strings live NUL-terminated in one byte arena:
//!
//! ```text
//!  0                                                  N
//! ┌──────────┬───┬──────────┬───┬──────┬───┬─────────┐
//! │ oldest.. │ 0 │ text     │ 0 │ new  │ 0 │ 0 0 0 0 │
//! └──────────┴───┴──────────┴───┴──────┴───┴─────────┘
//!                                          ▲ top
//! ```
//!
//! A string that does not fit before the end of the arena wraps to offset
//! 0; the unused tail is zero-filled first. Writing over the head of an
//! older string zeroes the rest of that string, so no fragment of it can
//! be mistaken for a notification later.

/// Default arena size in bytes
pub const NOTIFICATION_ARENA_SIZE: usize = 2048;

/// Identifies what the read cursor shows
///
/// The revision changes on every insert, so a new string landing at the
/// same offset is still seen as new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingCursor {
    pub offset: Option<usize>,
    pub revision: u32,
}

/// Circular text store with a bidirectional read cursor
#[derive(Debug, Clone)]
pub struct NotificationRing<const N: usize> {
    arena: [u8; N],
    /// Next write offset
    top: usize,
    /// Start of the string being shown
    current: Option<usize>,
    revision: u32,
}

impl<const N: usize> Default for NotificationRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NotificationRing<N> {
    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            arena: [0; N],
            top: 0,
            current: None,
            revision: 0,
        }
    }

    /// Store a string and make it current
    ///
    /// Text is cut at the first NUL and at `N - 1` bytes (on a character
    /// boundary). Returns `false` if nothing was stored.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.split('\0').next().unwrap_or("");
        let text = truncate(text, N.saturating_sub(1));
        if text.is_empty() {
            return false;
        }

        let len = text.len() + 1;
        if self.top + len > N {
            self.arena[self.top..].fill(0);
            self.top = 0;
        }

        let start = self.top;
        let end = start + len;
        // The byte before `end` tells whether `end` starts a string or sits
        // inside one we are about to cut in half
        let cuts_older = self.arena[end - 1] != 0;

        self.arena[start..end - 1].copy_from_slice(text.as_bytes());
        self.arena[end - 1] = 0;

        if cuts_older {
            let mut pos = end;
            while pos < N && self.arena[pos] != 0 {
                self.arena[pos] = 0;
                pos += 1;
            }
        }

        self.top = end;
        self.current = Some(start);
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// String under the read cursor
    pub fn current(&self) -> Option<&str> {
        self.current.and_then(|start| self.str_at(start))
    }

    /// Current cursor position and insert revision
    pub fn cursor(&self) -> RingCursor {
        RingCursor {
            offset: self.current,
            revision: self.revision,
        }
    }

    /// Move to the following string, wrapping around
    pub fn next(&mut self) {
        if let Some(cur) = self.current {
            self.current = (1..=N)
                .map(|step| (cur + step) % N)
                .find(|&pos| self.is_start(pos));
        }
    }

    /// Move to the preceding string, wrapping around
    pub fn prev(&mut self) {
        if let Some(cur) = self.current {
            self.current = (1..=N)
                .map(|step| (cur + N - step) % N)
                .find(|&pos| self.is_start(pos));
        }
    }

    /// Drop all strings
    pub fn clear(&mut self) {
        self.arena.fill(0);
        self.top = 0;
        self.current = None;
        self.revision = self.revision.wrapping_add(1);
    }

    /// Number of stored strings
    pub fn len(&self) -> usize {
        (0..N).filter(|&pos| self.is_start(pos)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Stored strings in arena order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..N)
            .filter(|&pos| self.is_start(pos))
            .filter_map(|pos| self.str_at(pos))
    }

    fn is_start(&self, pos: usize) -> bool {
        self.arena[pos] != 0 && (pos == 0 || self.arena[pos - 1] == 0)
    }

    fn str_at(&self, start: usize) -> Option<&str> {
        let tail = &self.arena[start..];
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        core::str::from_utf8(&tail[..len]).ok()
    }
}

/// Longest prefix of `text` no longer than `max` bytes
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
