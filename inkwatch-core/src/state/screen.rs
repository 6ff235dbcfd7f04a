//! Screen navigation
//!
//! ```text
//!            Back                 Menu
//!   Main <────────── any ──────────────> Info
//!     │                                   │
//!     └── Up / Down / notification ───> Notifications
//! ```

use super::events::Button;

/// Screens the watch can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Clock face
    #[default]
    Main,
    /// Notification reader
    Notifications,
    /// Device info, battery and link state
    Info,
}

/// Navigation inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nav {
    Back,
    Menu,
    /// Previous notification
    Up,
    /// Next notification
    Down,
    /// A notification was stored
    NotificationArrived,
}

impl Nav {
    /// Navigation triggered by a button press
    pub fn from_button(button: Button) -> Self {
        match button {
            Button::Menu => Nav::Menu,
            Button::Back => Nav::Back,
            Button::Up => Nav::Up,
            Button::Down => Nav::Down,
        }
    }
}

impl Screen {
    /// Process a navigation input and return the next screen
    pub fn transition(self, nav: Nav) -> Self {
        match nav {
            Nav::Back => Screen::Main,
            Nav::Menu => Screen::Info,
            Nav::Up | Nav::Down | Nav::NotificationArrived => Screen::Notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_always_returns_to_main() {
        for screen in [Screen::Main, Screen::Notifications, Screen::Info] {
            assert_eq!(screen.transition(Nav::Back), Screen::Main);
        }
    }

    #[test]
    fn test_menu_opens_info() {
        assert_eq!(Screen::Main.transition(Nav::Menu), Screen::Info);
        assert_eq!(Screen::Notifications.transition(Nav::Menu), Screen::Info);
    }

    #[test]
    fn test_notification_navigation() {
        assert_eq!(Screen::Main.transition(Nav::Up), Screen::Notifications);
        assert_eq!(Screen::Info.transition(Nav::Down), Screen::Notifications);
        assert_eq!(
            Screen::Main.transition(Nav::NotificationArrived),
            Screen::Notifications
        );
    }

    #[test]
    fn test_buttons_map_to_nav() {
        assert_eq!(Nav::from_button(Button::Back), Nav::Back);
        assert_eq!(Nav::from_button(Button::Menu), Nav::Menu);
        assert_eq!(Nav::from_button(Button::Up), Nav::Up);
        assert_eq!(Nav::from_button(Button::Down), Nav::Down);
    }
}
