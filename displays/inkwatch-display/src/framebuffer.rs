//! 1-bit frame buffer in panel RAM layout
//!
//! One bit per pixel, rows of `WIDTH / 8` bytes, most significant bit is
//! the leftmost pixel. A set bit is white, matching SSD168x RAM, so rows
//! can be streamed to the controller unchanged.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::layout::{HEIGHT, WIDTH};

const ROW_BYTES: usize = WIDTH as usize / 8;
const BUFFER_LEN: usize = ROW_BYTES * HEIGHT as usize;

/// Off-screen frame for a 200x200 panel
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    data: [u8; BUFFER_LEN],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// All white
    pub const fn new() -> Self {
        Self {
            data: [0xFF; BUFFER_LEN],
        }
    }

    fn index(point: Point) -> Option<(usize, u8)> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * ROW_BYTES + x / 8, 0x80 >> (x % 8)))
    }

    /// Color at `point`, `None` outside the panel
    pub fn pixel(&self, point: Point) -> Option<BinaryColor> {
        Self::index(point).map(|(byte, mask)| {
            if self.data[byte] & mask == 0 {
                BinaryColor::On
            } else {
                BinaryColor::Off
            }
        })
    }

    fn set_pixel(&mut self, point: Point, color: BinaryColor) {
        if let Some((byte, mask)) = Self::index(point) {
            match color {
                BinaryColor::On => self.data[byte] &= !mask,
                BinaryColor::Off => self.data[byte] |= mask,
            }
        }
    }

    /// Whole frame in panel RAM order
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes covering a byte-aligned window, row by row
    ///
    /// The window is clipped to the panel; its x range is widened to whole
    /// bytes.
    pub fn window_bytes(&self, window: Rectangle) -> impl Iterator<Item = u8> + '_ {
        let window = window.intersection(&self.bounding_box());
        let (first, last) = match window.bottom_right() {
            Some(br) => (window.top_left.x as usize / 8, br.x as usize / 8),
            None => (1, 0),
        };
        let top = window.top_left.y as usize;
        let rows = top..top + window.size.height as usize;
        rows.flat_map(move |y| {
            let row = &self.data[y * ROW_BYTES..(y + 1) * ROW_BYTES];
            row.get(first..=last).unwrap_or(&[]).iter().copied()
        })
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = match color {
            BinaryColor::On => 0x00,
            BinaryColor::Off => 0xFF,
        };
        self.data.fill(fill);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;
    use std::vec::Vec;

    #[test]
    fn test_starts_white() {
        let fb = FrameBuffer::new();
        assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(BinaryColor::Off));
        assert_eq!(fb.pixel(Point::new(200, 0)), None);
    }

    #[test]
    fn test_pixel_bit_layout() {
        let mut fb = FrameBuffer::new();
        Pixel(Point::new(9, 1), BinaryColor::On).draw(&mut fb).unwrap();
        // Row 1 starts at byte 25; x = 9 is bit 6 of the second byte
        assert_eq!(fb.as_bytes()[26], 0b1011_1111);
        assert_eq!(fb.pixel(Point::new(9, 1)), Some(BinaryColor::On));

        // Out of range pixels are ignored
        Pixel(Point::new(-1, 5), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(5, 200), BinaryColor::On).draw(&mut fb).unwrap();
        assert_eq!(fb.as_bytes().iter().filter(|&&b| b != 0xFF).count(), 1);
    }

    #[test]
    fn test_clear_black() {
        let mut fb = FrameBuffer::new();
        fb.clear(BinaryColor::On).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_window_bytes() {
        let mut fb = FrameBuffer::new();
        Rectangle::new(Point::new(8, 2), Size::new(16, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();

        let bytes: Vec<u8> = fb
            .window_bytes(Rectangle::new(Point::new(0, 2), Size::new(32, 2)))
            .collect();
        assert_eq!(bytes, [0xFF, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_window_is_clipped() {
        let fb = FrameBuffer::new();
        let count = fb
            .window_bytes(Rectangle::new(Point::new(192, 198), Size::new(64, 8)))
            .count();
        // One byte column, two rows left on the panel
        assert_eq!(count, 2);
        assert_eq!(fb.window_bytes(Rectangle::zero()).count(), 0);
    }
}
