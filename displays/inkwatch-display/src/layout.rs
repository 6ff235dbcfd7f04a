//! Screen geometry
//!
//! Main screen on the 200x200 panel:
//!
//! ```text
//!   0 ┌──────────────────────────────┐
//!     │ BT                      75%  │ status bar
//!  24 ├──────────────────────────────┤
//!  52 │  ┌──┐ ┌──┐    ┌──┐ ┌──┐      │
//!     │  │ H│ │ H│ :  │ M│ │ M│      │ time
//! 124 │  └──┘ └──┘    └──┘ └──┘      │
//! 140 │        Wed 01 May            │ date
//! 176 │  3 notifications             │ footer
//! 200 └──────────────────────────────┘
//!                 ▲ HALF_WINDOW ▲ DIGIT_WINDOW
//! ```
//!
//! Refresh windows start and end on byte boundaries in x, as the
//! controller addresses RAM in 8-pixel columns.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use inkwatch_core::display::RefreshTier;

/// Panel width in pixels
pub const WIDTH: u32 = 200;
/// Panel height in pixels
pub const HEIGHT: u32 = 200;

/// Status bar height
pub const STATUS_HEIGHT: u32 = 24;

/// Seven-segment digit cell
pub const DIGIT_SIZE: Size = Size::new(36, 72);
/// Top of the time digits
pub const DIGIT_Y: i32 = 52;
/// Left edge of each time digit (H H : M M)
pub const DIGIT_X: [i32; 4] = [8, 50, 110, 152];
/// Left edge of the colon
pub const COLON_X: i32 = 94;

/// Top of the date line
pub const DATE_Y: i32 = 140;
/// Top of the footer line
pub const FOOTER_Y: i32 = 176;

/// Text area below the status bar on list screens
pub const BODY: Rectangle = Rectangle::new(
    Point::new(4, STATUS_HEIGHT as i32 + 4),
    Size::new(WIDTH - 8, HEIGHT - STATUS_HEIGHT - 8),
);

/// Whole panel
pub const FULL_WINDOW: Rectangle = Rectangle::new(Point::zero(), Size::new(WIDTH, HEIGHT));

/// Both minute digits
pub const HALF_WINDOW: Rectangle = Rectangle::new(
    Point::new(104, DIGIT_Y),
    Size::new(WIDTH - 104, DIGIT_SIZE.height),
);

/// Last minute digit
pub const DIGIT_WINDOW: Rectangle = Rectangle::new(
    Point::new(DIGIT_X[3], DIGIT_Y),
    Size::new(40, DIGIT_SIZE.height),
);

/// Panel window to refresh for a tier
pub fn refresh_window(tier: RefreshTier) -> Rectangle {
    match tier {
        RefreshTier::Full => FULL_WINDOW,
        RefreshTier::Half => HALF_WINDOW,
        RefreshTier::Digit => DIGIT_WINDOW,
    }
}

/// Cell of time digit `index` (0-3)
pub fn digit_cell(index: usize) -> Rectangle {
    Rectangle::new(Point::new(DIGIT_X[index], DIGIT_Y), DIGIT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_aligned(r: Rectangle) -> bool {
        r.top_left.x % 8 == 0 && r.size.width % 8 == 0
    }

    #[test]
    fn test_windows_are_byte_aligned() {
        for tier in [RefreshTier::Digit, RefreshTier::Half, RefreshTier::Full] {
            assert!(byte_aligned(refresh_window(tier)));
        }
    }

    #[test]
    fn test_windows_nest() {
        let full = refresh_window(RefreshTier::Full);
        let half = refresh_window(RefreshTier::Half);
        let digit = refresh_window(RefreshTier::Digit);
        assert_eq!(full.intersection(&half), half);
        assert_eq!(half.intersection(&digit), digit);
    }

    #[test]
    fn test_minute_digits_inside_windows() {
        let half = refresh_window(RefreshTier::Half);
        let digit = refresh_window(RefreshTier::Digit);
        assert_eq!(half.intersection(&digit_cell(2)), digit_cell(2));
        assert_eq!(half.intersection(&digit_cell(3)), digit_cell(3));
        assert_eq!(digit.intersection(&digit_cell(3)), digit_cell(3));
        // Hour digits stay outside the half window
        assert_eq!(half.intersection(&digit_cell(1)).size.width, 0);
    }
}
