//! Button input
//!
//! One task per button. Buttons pull the pin low when pressed.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use inkwatch_core::input::Debouncer;
use inkwatch_core::state::{Button, Event};

use crate::channels::post;

/// Button task - turns pin edges into debounced press/release events
#[embassy_executor::task(pool_size = 4)]
pub async fn button_task(mut pin: Input<'static>, button: Button, debounce_ms: u16) {
    debug!("Button task started: {}", button);

    let mut debouncer = Debouncer::new();

    loop {
        pin.wait_for_any_edge().await;
        post(Event::ButtonChanged(button));

        Timer::after_millis(u64::from(debounce_ms)).await;

        if let Some(event) = debouncer.settle(button, pin.is_low()) {
            post(event);
        }
    }
}
