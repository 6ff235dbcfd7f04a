//! Seven-segment time digits
//!
//! ```text
//!  ─a─
//! f   b
//!  ─g─
//! e   c
//!  ─d─
//! ```

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

/// Segment stroke thickness
const STROKE: u32 = 6;

/// Segment bits (a = bit 0 .. g = bit 6) for 0-9
const SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Middle bar only, shown while the time is unknown
const PLACEHOLDER: u8 = 0x40;

/// Segment bits for a digit; `None` or out-of-range gives the placeholder
pub fn segments(digit: Option<u8>) -> u8 {
    digit
        .and_then(|d| SEGMENTS.get(usize::from(d)).copied())
        .unwrap_or(PLACEHOLDER)
}

/// Rectangle of segment `index` (0 = a .. 6 = g) inside `cell`
fn segment_rect(cell: Rectangle, index: u8) -> Rectangle {
    let (w, h) = (cell.size.width, cell.size.height);
    let t = STROKE;
    let half = h / 2;
    let bar = Size::new(w - 2 * t, t);
    let post = Size::new(t, half - t - t / 2);
    let upper = t as i32;
    let lower = (half + t / 2) as i32;

    let (offset, size) = match index {
        0 => (Point::new(t as i32, 0), bar),
        1 => (Point::new((w - t) as i32, upper), post),
        2 => (Point::new((w - t) as i32, lower), post),
        3 => (Point::new(t as i32, (h - t) as i32), bar),
        4 => (Point::new(0, lower), post),
        5 => (Point::new(0, upper), post),
        _ => (Point::new(t as i32, (half - t / 2) as i32), bar),
    };
    Rectangle::new(cell.top_left + offset, size)
}

/// Clear `cell` and draw one digit into it
pub fn draw_digit<D>(target: &mut D, cell: Rectangle, digit: Option<u8>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    cell.into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(target)?;

    let bits = segments(digit);
    let on = PrimitiveStyle::with_fill(BinaryColor::On);
    for index in 0..7 {
        if bits & (1 << index) != 0 {
            segment_rect(cell, index).into_styled(on).draw(target)?;
        }
    }
    Ok(())
}

/// Draw the hour/minute separator with its top-left at `origin`
pub fn draw_colon<D>(target: &mut D, origin: Point, height: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let dot = Size::new(STROKE + 2, STROKE + 2);
    let on = PrimitiveStyle::with_fill(BinaryColor::On);
    for y in [height / 3, height * 2 / 3] {
        Rectangle::new(origin + Point::new(0, y as i32 - 4), dot)
            .into_styled(on)
            .draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use embedded_graphics::primitives::PointsIter;

    fn cell() -> Rectangle {
        Rectangle::new(Point::new(8, 8), Size::new(36, 72))
    }

    fn lit(fb: &FrameBuffer, index: u8) -> bool {
        let center = segment_rect(cell(), index).center();
        fb.pixel(center) == Some(BinaryColor::On)
    }

    fn lit_segments(digit: Option<u8>) -> u8 {
        let mut fb = FrameBuffer::new();
        draw_digit(&mut fb, cell(), digit).unwrap();
        (0..7).filter(|&i| lit(&fb, i)).fold(0, |bits, i| bits | 1 << i)
    }

    #[test]
    fn test_drawn_segments_match_table() {
        for d in 0..10 {
            assert_eq!(lit_segments(Some(d)), SEGMENTS[usize::from(d)], "digit {}", d);
        }
    }

    #[test]
    fn test_placeholder_is_a_dash() {
        assert_eq!(lit_segments(None), PLACEHOLDER);
        assert_eq!(segments(Some(12)), PLACEHOLDER);
    }

    #[test]
    fn test_segments_do_not_overlap() {
        for a in 0..7 {
            for b in (a + 1)..7 {
                let overlap = segment_rect(cell(), a).intersection(&segment_rect(cell(), b));
                assert_eq!(overlap.size.width * overlap.size.height, 0, "{} {}", a, b);
            }
        }
    }

    #[test]
    fn test_redraw_clears_previous_digit() {
        let mut fb = FrameBuffer::new();
        draw_digit(&mut fb, cell(), Some(8)).unwrap();
        draw_digit(&mut fb, cell(), Some(1)).unwrap();
        assert!(!lit(&fb, 0));
        assert!(lit(&fb, 1));
    }

    #[test]
    fn test_drawing_stays_in_cell() {
        let mut fb = FrameBuffer::new();
        draw_digit(&mut fb, cell(), Some(8)).unwrap();
        let mut outside = fb.bounding_box().points().filter(|p| !cell().contains(*p));
        assert!(outside.all(|p| fb.pixel(p) == Some(BinaryColor::Off)));
    }
}
