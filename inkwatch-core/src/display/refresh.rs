//! Redraw decisions
//!
//! E-paper refreshes are slow and cost far more energy than anything else
//! the watch does, so each idle cycle picks the cheapest refresh that still
//! shows the right thing:
//!
//! | Screen        | Redraw when                              | Tier           |
//! |---------------|------------------------------------------|----------------|
//! | Main          | minute, connection or screen changed     | Full/Half/Digit|
//! | Notifications | screen changed or ring cursor moved      | Full           |
//! | Info          | screen changed                           | Full           |
//!
//! On the main screen a day, hour, connection or screen change needs the
//! whole panel, a new tens-of-minutes digit needs the time area, anything
//! else only the last digit.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::notifications::RingCursor;
use crate::state::Screen;

use super::retained::RetainedState;

/// Size of the panel area to refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshTier {
    /// Last minute digit only
    Digit,
    /// Time area
    Half,
    /// Whole panel
    Full,
}

/// What one idle cycle observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInputs {
    /// Local time, `None` if the RTC read failed
    pub now: Option<NaiveDateTime>,
    /// Companion app connected
    pub connected: bool,
    /// Notification ring read cursor
    pub ring: RingCursor,
}

/// A redraw to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RedrawPlan {
    pub screen: Screen,
    pub tier: RefreshTier,
    /// Time is unknown; draw a placeholder
    pub placeholder_time: bool,
}

/// Screen selection plus a snapshot of what the panel currently shows
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    screen: Screen,
    screen_changed: bool,
    prev_day: Option<u32>,
    prev_hour: Option<u32>,
    prev_minute: Option<u32>,
    prev_connected: Option<bool>,
    shown_ring: Option<RingCursor>,
}

impl DisplayState {
    /// Nothing shown yet; the first plan is a full redraw
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from state kept across a warm reset
    pub fn restore(retained: &RetainedState) -> Self {
        Self {
            prev_day: retained.prev_day.map(u32::from),
            prev_hour: retained.prev_hour.map(u32::from),
            prev_minute: retained.prev_minute.map(u32::from),
            prev_connected: Some(retained.prev_connected),
            ..Self::default()
        }
    }

    /// Values worth keeping across a warm reset
    pub fn retained(&self, boot_time_s: u32) -> RetainedState {
        RetainedState {
            boot_time_s,
            prev_day: self.prev_day.map(|v| v as u8),
            prev_hour: self.prev_hour.map(|v| v as u8),
            prev_minute: self.prev_minute.map(|v| v as u8),
            prev_connected: self.prev_connected.unwrap_or(false),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn screen_changed(&self) -> bool {
        self.screen_changed
    }

    /// Switch screens; flags a full redraw if the screen actually changes
    pub fn set_screen(&mut self, screen: Screen) {
        if screen != self.screen {
            self.screen = screen;
            self.screen_changed = true;
        }
    }

    /// Force the next plan to redraw the whole panel
    pub fn invalidate(&mut self) {
        self.screen_changed = true;
    }

    /// Decide whether and how much to redraw
    pub fn plan(&self, inputs: &FrameInputs) -> Option<RedrawPlan> {
        let connection_changed = self.prev_connected != Some(inputs.connected);

        let full = |screen| RedrawPlan {
            screen,
            tier: RefreshTier::Full,
            placeholder_time: inputs.now.is_none(),
        };

        match self.screen {
            Screen::Info => self.screen_changed.then(|| full(Screen::Info)),
            Screen::Notifications => {
                let moved = self.shown_ring != Some(inputs.ring);
                (self.screen_changed || moved).then(|| full(Screen::Notifications))
            }
            Screen::Main => {
                let Some(now) = inputs.now else {
                    // Placeholder only replaces what is there on real changes
                    return (self.screen_changed || connection_changed)
                        .then(|| full(Screen::Main));
                };

                let (day, hour, minute) = (now.day(), now.hour(), now.minute());
                let coarse_changed = self.prev_day != Some(day) || self.prev_hour != Some(hour);
                let minute_changed = self.prev_minute != Some(minute);

                if !(coarse_changed || minute_changed || connection_changed || self.screen_changed) {
                    return None;
                }

                let tier = if self.screen_changed || connection_changed || coarse_changed {
                    RefreshTier::Full
                } else if self.prev_minute.map(|m| m / 10) != Some(minute / 10) {
                    RefreshTier::Half
                } else {
                    RefreshTier::Digit
                };

                Some(RedrawPlan {
                    screen: Screen::Main,
                    tier,
                    placeholder_time: false,
                })
            }
        }
    }

    /// Record what was drawn
    ///
    /// Time fields are only taken from a valid RTC read, so a failed read
    /// never poisons the snapshot.
    pub fn commit(&mut self, _plan: &RedrawPlan, inputs: &FrameInputs) {
        self.screen_changed = false;
        self.prev_connected = Some(inputs.connected);
        self.shown_ring = Some(inputs.ring);

        if let Some(now) = inputs.now {
            self.prev_day = Some(now.day());
            self.prev_hour = Some(now.hour());
            self.prev_minute = Some(now.minute());
        }
    }
}
