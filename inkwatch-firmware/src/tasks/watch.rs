//! Watch task
//!
//! Owns the application state and the peripherals it drives. Waits for an
//! event (or the idle timeout), lets the application react, then carries
//! out the requested actions in order.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{self, Spi};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{with_timeout, Delay, Duration};
use embedded_graphics::primitives::Rectangle;
use embedded_hal_bus::spi::ExclusiveDevice;

use inkwatch_core::battery::{BlockSlot, LogBlock, LOG_BLOCK_SAMPLES};
use inkwatch_core::display::RefreshTier;
use inkwatch_core::{Action, Actions, App, IdleInputs};
use inkwatch_display::{render, EpdPanel, PanelError, View};
use inkwatch_drivers::{BatteryMonitor, Ssd1681, VibrationMotor};
use inkwatch_hal::flash::{FlashStorage, StorageKey};
use inkwatch_hal::rtc::{RtcError, WallClock};
use inkwatch_hal_rp2040::adc::VsysAdc;
use inkwatch_hal_rp2040::flash::Rp2040FlashStorage;
use inkwatch_hal_rp2040::rtc::Rp2040Clock;
use inkwatch_protocol::{battery_report, info_report, FIRMWARE_VERSION};

use crate::channels::{EVENTS, OUTBOUND};

/// SSD1681 on SPI1
pub type Panel = Ssd1681<
    ExclusiveDevice<Spi<'static, SPI1, spi::Async>, Output<'static>, Delay>,
    Output<'static>,
    Output<'static>,
    Input<'static>,
    Delay,
>;

/// Largest postcard encoding of a log block
const LOG_BLOCK_BUF: usize = 8 + LOG_BLOCK_SAMPLES * 3;

/// Everything the main loop works with
pub struct Watch {
    pub app: App,
    pub panel: Panel,
    pub motor: VibrationMotor<Output<'static>, Delay>,
    pub battery: BatteryMonitor<VsysAdc<'static>>,
    pub clock: Rp2040Clock<'static>,
    pub storage: Rp2040FlashStorage<'static>,
    pub watchdog: Watchdog,
    pub boot_time_s: u32,
}

/// Watch task - runs the main loop forever
#[embassy_executor::task]
pub async fn watch_task(mut watch: Watch) {
    info!("Watch task started");
    watch.run().await
}

impl Watch {
    async fn run(&mut self) -> ! {
        let idle_timeout = Duration::from_secs(u64::from(self.app.config().idle_timeout_s));
        let mut actions = Actions::new();

        loop {
            match with_timeout(idle_timeout, EVENTS.next()).await {
                Ok(event) => {
                    debug!("Event: {}", event);
                    self.app.dispatch(event, &mut actions);
                }
                Err(_) => trace!("Idle timeout"),
            }
            // Whatever queued up meanwhile is handled before the redraw
            while let Some(event) = EVENTS.try_next() {
                debug!("Event: {}", event);
                self.app.dispatch(event, &mut actions);
            }

            let inputs = self.sample().await;
            self.app.idle(&inputs, &mut actions);

            for action in core::mem::take(&mut actions) {
                self.perform(action, &inputs).await;
            }

            self.retain();
        }
    }

    /// Read the clock and the battery
    async fn sample(&mut self) -> IdleInputs {
        let now = match self.clock.now() {
            Ok(now) => Some(now),
            Err(RtcError::NotRunning) => None,
            Err(e) => {
                warn!("Clock read failed: {:?}", e);
                None
            }
        };
        let voltage_mv = match self.battery.read_millivolts().await {
            Ok(mv) => Some(mv),
            Err(e) => {
                warn!("Battery read failed: {:?}", e);
                None
            }
        };
        IdleInputs { now, voltage_mv }
    }

    async fn perform(&mut self, action: Action, inputs: &IdleInputs) {
        trace!("Action: {}", action);
        match action {
            Action::Vibrate(pattern) => {
                // GPIO output cannot fail
                let _ = self.motor.play(pattern).await;
            }
            Action::SetTime(time) => {
                if let Err(e) = self.clock.set(time) {
                    warn!("Failed to set clock: {:?}", e);
                }
            }
            Action::SendInfo => send(&info_report()),
            Action::SendBattery { level, charging } => send(&battery_report(level, charging)),
            Action::PersistLog { slot, block } => self.persist_log(slot, &block).await,
            Action::Redraw(plan) => {
                let app = &self.app;
                let view = View {
                    now: inputs.now,
                    connected: app.is_connected(),
                    battery_level: app.battery().last_level(),
                    charging: app.battery().is_charging(),
                    discharge_rate: app.battery().discharge_rate(),
                    notification: app.notifications().current(),
                    notification_count: app.notifications().len(),
                    device_name: app.config().device_name.as_str(),
                    firmware: FIRMWARE_VERSION,
                };
                let window = match render(&mut self.panel, &plan, &view) {
                    Ok(window) => window,
                    Err(never) => match never {},
                };

                match show(&mut self.panel, window, plan.tier).await {
                    Ok(()) => self.app.commit_redraw(&plan),
                    Err(e) => warn!("Panel refresh failed: {:?}", e),
                }
            }
        }
    }

    async fn persist_log(&mut self, slot: BlockSlot, block: &LogBlock) {
        let mut buf = [0u8; LOG_BLOCK_BUF];
        match postcard::to_slice(block, &mut buf) {
            Ok(bytes) => {
                if let Err(e) = self
                    .storage
                    .write(StorageKey::BatteryLog(slot.write), bytes)
                    .await
                {
                    error!("Failed to write battery log {}: {:?}", slot.write, e);
                    return;
                }
            }
            Err(_) => {
                error!("Failed to serialize battery log");
                return;
            }
        }

        if let Some(expired) = slot.delete {
            if let Err(e) = self.storage.remove(StorageKey::BatteryLog(expired)).await {
                error!("Failed to delete battery log {}: {:?}", expired, e);
            }
        }
    }

    /// Stash the refresh state where a warm reset can find it
    fn retain(&mut self) {
        let words = self.app.retained(self.boot_time_s).to_words();
        for (index, word) in words.into_iter().enumerate() {
            self.watchdog.set_scratch(index, word);
        }
    }
}

/// Queue a payload for the link TX task
fn send(payload: &[u8]) {
    match heapless::Vec::from_slice(payload) {
        Ok(payload) => {
            if OUTBOUND.try_send(payload).is_err() {
                warn!("Outbound queue full, dropping report");
            }
        }
        Err(()) => warn!("Report too long for a bridge record"),
    }
}

/// Wake the panel, refresh one window and put it back to sleep
async fn show(panel: &mut Panel, window: Rectangle, tier: RefreshTier) -> Result<(), PanelError> {
    panel.init().await?;
    let refreshed = panel.refresh(window, tier).await;
    // Sleep even after a failed refresh
    let slept = panel.deep_sleep().await;
    refreshed.and(slept)
}
