//! Screen renderer
//!
//! [`render`] draws what a [`RedrawPlan`] asks for and returns the panel
//! window to refresh. Partial tiers only touch pixels inside their
//! window, so a partial redraw leaves the frame identical to a full
//! redraw of the same view.

use core::fmt::Write;

use chrono::{Datelike, NaiveDateTime, Timelike};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::style::TextBoxStyleBuilder;
use embedded_text::TextBox;
use heapless::String;
use inkwatch_core::display::{RedrawPlan, RefreshTier};
use inkwatch_core::state::Screen;
use inkwatch_protocol::Version;

use crate::digits::{draw_colon, draw_digit};
use crate::layout::{
    digit_cell, refresh_window, BODY, COLON_X, DATE_Y, DIGIT_SIZE, DIGIT_Y, FOOTER_Y,
    HALF_WINDOW, STATUS_HEIGHT, WIDTH,
};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Line pitch for small text
const LINE_HEIGHT: i32 = 16;

/// Everything the screens show
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// Local time, `None` when unknown
    pub now: Option<NaiveDateTime>,
    pub connected: bool,
    pub battery_level: Option<u8>,
    pub charging: bool,
    /// Percent per day
    pub discharge_rate: u16,
    /// Notification under the read cursor
    pub notification: Option<&'a str>,
    pub notification_count: usize,
    pub device_name: &'a str,
    pub firmware: Version,
}

fn small() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
}

fn large() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_10X20, BinaryColor::On)
}

/// Time digits H H M M, `None` each when the time is unknown
fn time_digits(now: Option<NaiveDateTime>) -> [Option<u8>; 4] {
    match now {
        Some(t) => {
            let (h, m) = (t.hour() as u8, t.minute() as u8);
            [Some(h / 10), Some(h % 10), Some(m / 10), Some(m % 10)]
        }
        None => [None; 4],
    }
}

/// Draw `plan` into `target` and return the window to refresh
pub fn render<D>(target: &mut D, plan: &RedrawPlan, view: &View<'_>) -> Result<Rectangle, D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let now = if plan.placeholder_time { None } else { view.now };

    let tier = match plan.screen {
        Screen::Main => plan.tier,
        // Only the main screen has partial layouts
        Screen::Notifications | Screen::Info => RefreshTier::Full,
    };

    let digits = time_digits(now);
    match (plan.screen, tier) {
        (Screen::Main, RefreshTier::Digit) => {
            draw_digit(target, digit_cell(3), digits[3])?;
        }
        (Screen::Main, RefreshTier::Half) => {
            HALF_WINDOW
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                .draw(target)?;
            draw_digit(target, digit_cell(2), digits[2])?;
            draw_digit(target, digit_cell(3), digits[3])?;
        }
        (Screen::Main, RefreshTier::Full) => {
            target.clear(BinaryColor::Off)?;
            draw_main(target, now, view)?;
        }
        (Screen::Notifications, _) => {
            target.clear(BinaryColor::Off)?;
            draw_notifications(target, view)?;
        }
        (Screen::Info, _) => {
            target.clear(BinaryColor::Off)?;
            draw_info(target, view)?;
        }
    }

    Ok(refresh_window(tier))
}

fn draw_status_bar<D>(target: &mut D, title: &str, view: &View<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_baseline(title, Point::new(4, 7), small(), Baseline::Top).draw(target)?;

    let mut battery: String<8> = String::new();
    let _ = match view.battery_level {
        Some(level) if view.charging => write!(battery, "+{}%", level),
        Some(level) => write!(battery, "{}%", level),
        None => write!(battery, "--%"),
    };
    let right = TextStyleBuilder::new()
        .alignment(Alignment::Right)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(&battery, Point::new(WIDTH as i32 - 4, 7), small(), right)
        .draw(target)?;

    let y = STATUS_HEIGHT as i32 - 1;
    Line::new(Point::new(0, y), Point::new(WIDTH as i32 - 1, y))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;
    Ok(())
}

fn draw_main<D>(target: &mut D, now: Option<NaiveDateTime>, view: &View<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_status_bar(target, if view.connected { "BT" } else { "" }, view)?;

    for (index, digit) in time_digits(now).into_iter().enumerate() {
        draw_digit(target, digit_cell(index), digit)?;
    }
    draw_colon(target, Point::new(COLON_X, DIGIT_Y), DIGIT_SIZE.height)?;

    let mut date: String<16> = String::new();
    let _ = match now {
        Some(t) => write!(
            date,
            "{} {:02} {}",
            WEEKDAYS[t.weekday().num_days_from_monday() as usize],
            t.day(),
            MONTHS[t.month0() as usize]
        ),
        None => write!(date, "--- -- ---"),
    };
    let centered = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(&date, Point::new(WIDTH as i32 / 2, DATE_Y), large(), centered)
        .draw(target)?;

    if view.notification_count > 0 {
        let mut footer: String<24> = String::new();
        let plural = if view.notification_count == 1 { "" } else { "s" };
        write!(footer, "{} notification{}", view.notification_count, plural).ok();
        Text::with_text_style(&footer, Point::new(WIDTH as i32 / 2, FOOTER_Y), small(), centered)
            .draw(target)?;
    }
    Ok(())
}

fn draw_notifications<D>(target: &mut D, view: &View<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_status_bar(target, "Notifications", view)?;

    let (text, alignment, vertical) = match view.notification {
        Some(text) => (text, HorizontalAlignment::Left, VerticalAlignment::Top),
        None => (
            "No notifications",
            HorizontalAlignment::Center,
            VerticalAlignment::Middle,
        ),
    };
    let textbox_style = TextBoxStyleBuilder::new()
        .alignment(alignment)
        .vertical_alignment(vertical)
        .build();
    TextBox::with_textbox_style(text, BODY, small(), textbox_style).draw(target)?;
    Ok(())
}

fn draw_info<D>(target: &mut D, view: &View<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_status_bar(target, "Info", view)?;

    let top = BODY.top_left.y;
    Text::with_baseline(view.device_name, Point::new(4, top), large(), Baseline::Top)
        .draw(target)?;

    let mut lines: [String<24>; 4] = Default::default();
    let fw = view.firmware;
    write!(lines[0], "Firmware {}.{}.{}", fw.major, fw.minor, fw.patch).ok();
    let _ = match view.battery_level {
        Some(level) => write!(lines[1], "Battery {}%", level),
        None => write!(lines[1], "Battery --"),
    };
    if view.charging {
        write!(lines[2], "Charging").ok();
    } else {
        write!(lines[2], "Drain {}%/day", view.discharge_rate).ok();
    }
    let link = if view.connected { "connected" } else { "idle" };
    write!(lines[3], "Link {}", link).ok();

    let mut y = top + 32;
    for line in &lines {
        Text::with_baseline(line, Point::new(4, y), small(), Baseline::Top).draw(target)?;
        y += LINE_HEIGHT;
    }
    Ok(())
}
