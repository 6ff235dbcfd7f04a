//! Events delivered to the dispatcher

use chrono::NaiveDateTime;
use inkwatch_protocol::{Command, Notification};

/// Physical buttons, numbered as wired on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Menu,
    Back,
    Up,
    Down,
}

impl Button {
    /// All buttons in index order
    pub const ALL: [Button; 4] = [Button::Menu, Button::Back, Button::Up, Button::Down];

    /// Button index (0-3)
    pub fn index(self) -> usize {
        match self {
            Button::Menu => 0,
            Button::Back => 1,
            Button::Up => 2,
            Button::Down => 3,
        }
    }

    /// Button from index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Everything the main loop reacts to
///
/// Payload-bearing variants own their payload; it is dropped when the
/// dispatcher is done with the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Input events
    /// Raw edge seen on a button, not yet debounced
    ButtonChanged(Button),
    /// Debounced press
    ButtonPressed(Button),
    /// Debounced release
    ButtonReleased(Button),

    // Link events
    /// Companion app connected
    ClientConnected,
    /// Companion app disconnected
    ClientDisconnected,
    /// Companion app subscribed to notifications from the watch
    ClientSubscribed,
    /// Notification pushed by the companion app
    ClientNotification(Notification),
    /// Time sync
    ClientTime(NaiveDateTime),
    /// Companion app wants the watch to make itself noticed
    ClientFind,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Event::ButtonChanged(b) => defmt::write!(f, "ButtonChanged({})", b),
            Event::ButtonPressed(b) => defmt::write!(f, "ButtonPressed({})", b),
            Event::ButtonReleased(b) => defmt::write!(f, "ButtonReleased({})", b),
            Event::ClientConnected => defmt::write!(f, "ClientConnected"),
            Event::ClientDisconnected => defmt::write!(f, "ClientDisconnected"),
            Event::ClientSubscribed => defmt::write!(f, "ClientSubscribed"),
            Event::ClientNotification(n) => {
                defmt::write!(f, "ClientNotification(icon={}, {} bytes)", n.icon, n.text.len())
            }
            Event::ClientTime(t) => defmt::write!(f, "ClientTime({})", defmt::Debug2Format(t)),
            Event::ClientFind => defmt::write!(f, "ClientFind"),
        }
    }
}

impl Event {
    /// Map a decoded command to the event it raises
    ///
    /// Alarms are decoded but have no event yet.
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::Notification(n) => Some(Event::ClientNotification(n)),
            Command::Find => Some(Event::ClientFind),
            Command::TimeSync(t) => Some(Event::ClientTime(t)),
            Command::Alarm => None,
        }
    }

    /// Check if this event comes from a button
    pub fn is_button_event(&self) -> bool {
        matches!(
            self,
            Event::ButtonChanged(_) | Event::ButtonPressed(_) | Event::ButtonReleased(_)
        )
    }

    /// Check if this event comes from the companion-app link
    pub fn is_client_event(&self) -> bool {
        !self.is_button_event()
    }
}
