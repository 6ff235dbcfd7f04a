//! SSD1681 e-paper controller (200x200, SPI)
//!
//! Drawing goes to an in-memory [`FrameBuffer`]; [`EpdPanel::refresh`]
//! streams a window of it to controller RAM and runs the waveform. After
//! each refresh the window is also written to the "previous" RAM so the
//! next partial update diffs against what is on the glass.

use core::convert::Infallible;

use embassy_futures::select::{select, Either};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiDevice;
use inkwatch_core::display::RefreshTier;
use inkwatch_display::{EpdPanel, FrameBuffer, PanelError};

/// SSD1681 commands
mod cmd {
    pub const DRIVER_OUTPUT: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMP_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_PREVIOUS: u8 = 0x26;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const RAM_X_RANGE: u8 = 0x44;
    pub const RAM_Y_RANGE: u8 = 0x45;
    pub const RAM_X_COUNTER: u8 = 0x4E;
    pub const RAM_Y_COUNTER: u8 = 0x4F;
}

/// Update sequence: full waveform
const UPDATE_FULL: u8 = 0xF7;
/// Update sequence: partial (differential) waveform
const UPDATE_PARTIAL: u8 = 0xFC;

/// Longest refresh observed is ~2 s
const BUSY_TIMEOUT_MS: u32 = 5_000;

const CHUNK: usize = 64;

/// SSD1681 panel driver
pub struct Ssd1681<SPI, DC, RST, BUSY, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    frame: FrameBuffer,
}

impl<SPI, DC, RST, BUSY, D> Ssd1681<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: Wait,
    D: DelayNs,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            frame: FrameBuffer::new(),
        }
    }

    /// Current frame contents
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    async fn command(&mut self, command: u8, data: &[u8]) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Communication)?;
        self.spi
            .write(&[command])
            .await
            .map_err(|_| PanelError::Communication)?;
        if !data.is_empty() {
            self.dc.set_high().map_err(|_| PanelError::Communication)?;
            self.spi
                .write(data)
                .await
                .map_err(|_| PanelError::Communication)?;
        }
        Ok(())
    }

    /// BUSY is high while the controller works
    async fn wait_idle(&mut self) -> Result<(), PanelError> {
        match select(
            self.busy.wait_for_low(),
            self.delay.delay_ms(BUSY_TIMEOUT_MS),
        )
        .await
        {
            Either::First(result) => result.map_err(|_| PanelError::Communication),
            Either::Second(()) => Err(PanelError::Timeout),
        }
    }

    async fn set_window(&mut self, window: Rectangle) -> Result<(), PanelError> {
        let Some(bottom_right) = window.bottom_right() else {
            return Err(PanelError::InvalidWindow);
        };
        let (x0, x1) = ((window.top_left.x / 8) as u8, (bottom_right.x / 8) as u8);
        let [y0_lo, y0_hi] = (window.top_left.y as u16).to_le_bytes();
        let [y1_lo, y1_hi] = (bottom_right.y as u16).to_le_bytes();

        self.command(cmd::RAM_X_RANGE, &[x0, x1]).await?;
        self.command(cmd::RAM_Y_RANGE, &[y0_lo, y0_hi, y1_lo, y1_hi])
            .await?;
        self.command(cmd::RAM_X_COUNTER, &[x0]).await?;
        self.command(cmd::RAM_Y_COUNTER, &[y0_lo, y0_hi]).await
    }

    async fn write_ram(&mut self, ram: u8, window: Rectangle) -> Result<(), PanelError> {
        self.set_window(window).await?;
        self.command(ram, &[]).await?;
        self.dc.set_high().map_err(|_| PanelError::Communication)?;

        let mut chunk = [0u8; CHUNK];
        let mut len = 0;
        for byte in self.frame.window_bytes(window) {
            chunk[len] = byte;
            len += 1;
            if len == CHUNK {
                self.spi
                    .write(&chunk)
                    .await
                    .map_err(|_| PanelError::Communication)?;
                len = 0;
            }
        }
        if len > 0 {
            self.spi
                .write(&chunk[..len])
                .await
                .map_err(|_| PanelError::Communication)?;
        }
        Ok(())
    }

    /// Clip to the panel and widen to whole RAM bytes in x
    fn align(&self, window: Rectangle) -> Option<Rectangle> {
        let window = window.intersection(&self.frame.bounding_box());
        let bottom_right = window.bottom_right()?;
        let x0 = window.top_left.x / 8 * 8;
        let x1 = bottom_right.x / 8 * 8 + 8;
        Some(Rectangle::with_corners(
            Point::new(x0, window.top_left.y),
            Point::new(x1 - 1, bottom_right.y),
        ))
    }
}

impl<SPI, DC, RST, BUSY, D> OriginDimensions for Ssd1681<SPI, DC, RST, BUSY, D> {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl<SPI, DC, RST, BUSY, D> DrawTarget for Ssd1681<SPI, DC, RST, BUSY, D> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.frame.clear(color)
    }
}

impl<SPI, DC, RST, BUSY, D> EpdPanel for Ssd1681<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: Wait,
    D: DelayNs,
{
    async fn init(&mut self) -> Result<(), PanelError> {
        // Hardware reset also wakes the controller from deep sleep
        self.rst.set_low().map_err(|_| PanelError::Communication)?;
        self.delay.delay_ms(10).await;
        self.rst.set_high().map_err(|_| PanelError::Communication)?;
        self.delay.delay_ms(10).await;
        self.wait_idle().await?;

        self.command(cmd::SW_RESET, &[]).await?;
        self.wait_idle().await?;

        // 200 gate lines, scan top to bottom
        self.command(cmd::DRIVER_OUTPUT, &[0xC7, 0x00, 0x00]).await?;
        // X then Y increment
        self.command(cmd::DATA_ENTRY_MODE, &[0x03]).await?;
        self.command(cmd::BORDER_WAVEFORM, &[0x05]).await?;
        // Internal temperature sensor
        self.command(cmd::TEMP_SENSOR, &[0x80]).await?;
        self.wait_idle().await
    }

    async fn refresh(&mut self, window: Rectangle, tier: RefreshTier) -> Result<(), PanelError> {
        let window = self.align(window).ok_or(PanelError::InvalidWindow)?;

        self.write_ram(cmd::WRITE_RAM_BW, window).await?;

        let sequence = match tier {
            RefreshTier::Full => UPDATE_FULL,
            RefreshTier::Half | RefreshTier::Digit => UPDATE_PARTIAL,
        };
        self.command(cmd::UPDATE_CONTROL_2, &[sequence]).await?;
        self.command(cmd::MASTER_ACTIVATION, &[]).await?;
        self.wait_idle().await?;

        self.write_ram(cmd::WRITE_RAM_PREVIOUS, window).await
    }

    async fn deep_sleep(&mut self) -> Result<(), PanelError> {
        // Mode 1 keeps RAM, so the next partial refresh still has a base
        self.command(cmd::DEEP_SLEEP, &[0x01]).await
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use embedded_hal_async::spi::Operation;
    use inkwatch_display::layout::{DIGIT_WINDOW, FULL_WINDOW};
    use std::rc::Rc;
    use std::vec;
    use std::vec::Vec;

    /// Commands with their data bytes, in order
    #[derive(Default)]
    struct Bus {
        data_mode: bool,
        log: Vec<(u8, Vec<u8>)>,
    }

    type Shared = Rc<RefCell<Bus>>;

    struct MockSpi(Shared);

    impl embedded_hal_async::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiDevice for MockSpi {
        async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            let mut bus = self.0.borrow_mut();
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    if bus.data_mode {
                        if let Some((_, data)) = bus.log.last_mut() {
                            data.extend_from_slice(bytes);
                        }
                    } else {
                        for &b in bytes.iter() {
                            bus.log.push((b, Vec::new()));
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct MockDc(Shared);

    impl embedded_hal::digital::ErrorType for MockDc {
        type Error = Infallible;
    }

    impl OutputPin for MockDc {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().data_mode = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().data_mode = true;
            Ok(())
        }
    }

    struct NoPin;

    impl embedded_hal::digital::ErrorType for NoPin {
        type Error = Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// BUSY line that is either always idle or stuck busy
    struct Busy {
        stuck: bool,
    }

    impl embedded_hal::digital::ErrorType for Busy {
        type Error = Infallible;
    }

    impl Busy {
        async fn settle(&self) -> Result<(), Infallible> {
            if self.stuck {
                core::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    impl Wait for Busy {
        async fn wait_for_high(&mut self) -> Result<(), Infallible> {
            self.settle().await
        }

        async fn wait_for_low(&mut self) -> Result<(), Infallible> {
            self.settle().await
        }

        async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
            self.settle().await
        }

        async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
            self.settle().await
        }

        async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
            self.settle().await
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn panel(stuck: bool) -> (Ssd1681<MockSpi, MockDc, NoPin, Busy, NoDelay>, Shared) {
        let bus = Shared::default();
        let panel = Ssd1681::new(
            MockSpi(bus.clone()),
            MockDc(bus.clone()),
            NoPin,
            Busy { stuck },
            NoDelay,
        );
        (panel, bus)
    }

    fn commands(bus: &Shared) -> Vec<u8> {
        bus.borrow().log.iter().map(|(c, _)| *c).collect()
    }

    fn data_of(bus: &Shared, command: u8) -> Vec<Vec<u8>> {
        bus.borrow()
            .log
            .iter()
            .filter(|(c, _)| *c == command)
            .map(|(_, d)| d.clone())
            .collect()
    }

    #[test]
    fn test_init_sequence() {
        let (mut panel, bus) = panel(false);
        block_on(panel.init()).unwrap();
        assert_eq!(commands(&bus), [0x12, 0x01, 0x11, 0x3C, 0x18]);
        assert_eq!(data_of(&bus, cmd::DRIVER_OUTPUT), [vec![0xC7, 0x00, 0x00]]);
    }

    #[test]
    fn test_partial_refresh_window() {
        let (mut panel, bus) = panel(false);
        block_on(panel.refresh(DIGIT_WINDOW, RefreshTier::Digit)).unwrap();

        // x 152..192 is RAM bytes 19..=23, y 52..124
        assert_eq!(data_of(&bus, cmd::RAM_X_RANGE)[0], [19, 23]);
        assert_eq!(data_of(&bus, cmd::RAM_Y_RANGE)[0], [52, 0, 123, 0]);
        assert_eq!(data_of(&bus, cmd::RAM_Y_COUNTER)[0], [52, 0]);
        assert_eq!(data_of(&bus, cmd::UPDATE_CONTROL_2), [vec![UPDATE_PARTIAL]]);

        let current = data_of(&bus, cmd::WRITE_RAM_BW);
        let previous = data_of(&bus, cmd::WRITE_RAM_PREVIOUS);
        assert_eq!(current[0].len(), 5 * 72);
        assert_eq!(current, previous);

        let order = commands(&bus);
        let activate = order.iter().position(|&c| c == cmd::MASTER_ACTIVATION);
        let prev = order.iter().position(|&c| c == cmd::WRITE_RAM_PREVIOUS);
        assert!(activate < prev);
    }

    #[test]
    fn test_full_refresh_sends_frame() {
        let (mut panel, bus) = panel(false);
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut panel).unwrap();
        block_on(panel.refresh(FULL_WINDOW, RefreshTier::Full)).unwrap();

        assert_eq!(data_of(&bus, cmd::UPDATE_CONTROL_2), [vec![UPDATE_FULL]]);
        let ram = &data_of(&bus, cmd::WRITE_RAM_BW)[0];
        assert_eq!(ram.len(), 25 * 200);
        assert_eq!(ram[0], 0x7F);
    }

    #[test]
    fn test_unaligned_window_is_widened() {
        let (mut panel, bus) = panel(false);
        let window = Rectangle::new(Point::new(10, 0), Size::new(3, 1));
        block_on(panel.refresh(window, RefreshTier::Digit)).unwrap();
        assert_eq!(data_of(&bus, cmd::RAM_X_RANGE)[0], [1, 1]);
        assert_eq!(data_of(&bus, cmd::WRITE_RAM_BW)[0].len(), 1);
    }

    #[test]
    fn test_empty_window_rejected() {
        let (mut panel, bus) = panel(false);
        let off_panel = Rectangle::new(Point::new(300, 300), Size::new(8, 8));
        assert_eq!(
            block_on(panel.refresh(off_panel, RefreshTier::Full)),
            Err(PanelError::InvalidWindow)
        );
        assert!(commands(&bus).is_empty());
    }

    #[test]
    fn test_stuck_busy_times_out() {
        let (mut panel, _) = panel(true);
        assert_eq!(block_on(panel.init()), Err(PanelError::Timeout));
    }

    #[test]
    fn test_deep_sleep() {
        let (mut panel, bus) = panel(false);
        block_on(panel.deep_sleep()).unwrap();
        assert_eq!(data_of(&bus, cmd::DEEP_SLEEP), [vec![0x01]]);
    }
}
