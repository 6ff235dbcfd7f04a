//! E-paper panel trait
//!
//! Drawing goes to the panel's frame buffer through `DrawTarget`; nothing
//! shows up until [`EpdPanel::refresh`] pushes a window to the glass.

use core::future::Future;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use inkwatch_core::display::RefreshTier;

/// Panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// SPI or control pin failure
    Communication,
    /// Controller stayed busy too long
    Timeout,
    /// Window outside the panel
    InvalidWindow,
}

/// Bistable panel with windowed refresh
pub trait EpdPanel: DrawTarget<Color = BinaryColor> {
    /// Wake the controller and load its configuration
    fn init(&mut self) -> impl Future<Output = Result<(), PanelError>>;

    /// Push `window` of the frame buffer to the panel and refresh it
    ///
    /// [`RefreshTier::Full`] uses the full waveform, which clears ghosting;
    /// smaller tiers use the fast partial waveform.
    fn refresh(
        &mut self,
        window: Rectangle,
        tier: RefreshTier,
    ) -> impl Future<Output = Result<(), PanelError>>;

    /// Enter deep sleep; [`EpdPanel::init`] is needed before the next refresh
    fn deep_sleep(&mut self) -> impl Future<Output = Result<(), PanelError>>;
}
