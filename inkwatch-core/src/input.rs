//! Button debouncing
//!
//! A raw edge only starts the settle timer (owned by the firmware task).
//! When the timer fires, the level read at that moment is fed here and is
//! turned into a press or release, unless it matches the last settled
//! level (contact bounce that ended where it started).

use crate::state::{Button, Event};

/// Settled level per button
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    pressed: [bool; 4],
}

impl Debouncer {
    /// All buttons released
    pub const fn new() -> Self {
        Self {
            pressed: [false; 4],
        }
    }

    /// Feed the level read after the settle delay
    pub fn settle(&mut self, button: Button, pressed: bool) -> Option<Event> {
        let slot = &mut self.pressed[button.index()];
        if *slot == pressed {
            return None;
        }
        *slot = pressed;
        Some(if pressed {
            Event::ButtonPressed(button)
        } else {
            Event::ButtonReleased(button)
        })
    }

    /// Last settled level
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }
}
