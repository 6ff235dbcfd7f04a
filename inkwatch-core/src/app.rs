//! Dispatcher
//!
//! [`App`] owns every piece of application state: display snapshot,
//! notification ring, battery estimator and link status. The main loop
//! moves each event into [`App::dispatch`] and calls [`App::idle`] after
//! every event and on queue timeout. Side effects come back as
//! [`Action`]s for the firmware to carry out.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use heapless::Vec;

use crate::battery::{BatteryEstimator, BlockRing, BlockSlot, LogBlock};
use crate::config::{VibrationPattern, WatchConfig};
use crate::display::{DisplayState, FrameInputs, RedrawPlan, RetainedState};
use crate::notifications::{classify, NotificationRing, Verdict, NOTIFICATION_ARENA_SIZE};
use crate::state::{Button, Event, Nav};

/// Most actions a single dispatch or idle pass produces
pub const MAX_ACTIONS: usize = 8;

/// Side effects requested by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a vibration burst
    Vibrate(VibrationPattern),
    /// Set the RTC
    SetTime(NaiveDateTime),
    /// Send the info report to the subscriber
    SendInfo,
    /// Send a battery report to the subscriber
    SendBattery { level: u8, charging: bool },
    /// Write a log block, then delete the expired one
    PersistLog { slot: BlockSlot, block: LogBlock },
    /// Draw a screen; report completion with [`App::commit_redraw`]
    Redraw(RedrawPlan),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Action {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Action::Vibrate(p) => defmt::write!(f, "Vibrate({})", p),
            Action::SetTime(t) => defmt::write!(f, "SetTime({})", defmt::Debug2Format(t)),
            Action::SendInfo => defmt::write!(f, "SendInfo"),
            Action::SendBattery { level, charging } => {
                defmt::write!(f, "SendBattery({}%, charging={})", level, charging)
            }
            Action::PersistLog { slot, .. } => defmt::write!(f, "PersistLog({})", slot),
            Action::Redraw(plan) => defmt::write!(f, "Redraw({})", plan),
        }
    }
}

/// Output buffer for actions
pub type Actions = Vec<Action, MAX_ACTIONS>;

/// Hardware readings taken at the start of an idle pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleInputs {
    /// Local time, `None` if the RTC read failed
    pub now: Option<NaiveDateTime>,
    /// Battery voltage, `None` if the ADC read failed
    pub voltage_mv: Option<u16>,
}

/// Application context
pub struct App<const N: usize = NOTIFICATION_ARENA_SIZE> {
    config: WatchConfig,
    display: DisplayState,
    notifications: NotificationRing<N>,
    battery: BatteryEstimator,
    log_ring: BlockRing,
    connected: bool,
    subscribed: bool,
    ringing: bool,
    last_reported_level: Option<u8>,
    /// Frame behind the redraw handed out last
    pending_frame: Option<FrameInputs>,
}

fn push(actions: &mut Actions, action: Action) {
    // Capacity covers the worst case of one pass
    let _ = actions.push(action);
}

impl<const N: usize> App<N> {
    /// Fresh application state
    pub fn new(config: WatchConfig, log_ring: BlockRing) -> Self {
        let battery = BatteryEstimator::new(config.battery);
        Self {
            config,
            display: DisplayState::new(),
            notifications: NotificationRing::new(),
            battery,
            log_ring,
            connected: false,
            subscribed: false,
            ringing: false,
            last_reported_level: None,
            pending_frame: None,
        }
    }

    /// Application state after a warm reset
    pub fn resume(config: WatchConfig, log_ring: BlockRing, retained: &RetainedState) -> Self {
        let mut app = Self::new(config, log_ring);
        app.display = DisplayState::restore(retained);
        app
    }

    /// Handle one event; the event and its payload are dropped on return
    pub fn dispatch(&mut self, event: Event, actions: &mut Actions) {
        match event {
            // Raw edges are resolved by the debounce task
            Event::ButtonChanged(_) | Event::ButtonReleased(_) => {}
            Event::ButtonPressed(button) => self.on_button(button),
            Event::ClientConnected => self.connected = true,
            Event::ClientDisconnected => {
                self.connected = false;
                self.subscribed = false;
            }
            Event::ClientSubscribed => {
                self.subscribed = true;
                if self.connected {
                    push(actions, Action::SendInfo);
                    if let Some(level) = self.battery.last_level() {
                        self.report_battery(level, actions);
                    }
                }
            }
            Event::ClientNotification(mut notification) => match classify(&mut notification) {
                Verdict::Accept { call } => {
                    let stored = self.notifications.add(&notification.text);
                    let pattern = if call {
                        self.ringing = true;
                        self.config.vibration.call
                    } else {
                        self.config.vibration.notification
                    };
                    push(actions, Action::Vibrate(pattern));
                    // A call without caller text still rings but has nothing to show
                    if stored {
                        let screen = self.display.screen().transition(Nav::NotificationArrived);
                        self.display.set_screen(screen);
                        self.display.invalidate();
                    }
                }
                Verdict::CancelCall => self.ringing = false,
                Verdict::Reject => {}
            },
            Event::ClientTime(time) => {
                let offset = TimeDelta::try_minutes(i64::from(self.config.timezone_offset_min));
                if let Some(local) = offset.and_then(|o| time.checked_add_signed(o)) {
                    push(actions, Action::SetTime(local));
                }
            }
            Event::ClientFind => push(actions, Action::Vibrate(self.config.vibration.find)),
        }
    }

    fn on_button(&mut self, button: Button) {
        match button {
            Button::Up => self.notifications.prev(),
            Button::Down => self.notifications.next(),
            Button::Menu | Button::Back => {}
        }
        let screen = self.display.screen().transition(Nav::from_button(button));
        self.display.set_screen(screen);
    }

    /// Periodic work: ring repeat, battery, redraw decision
    pub fn idle(&mut self, inputs: &IdleInputs, actions: &mut Actions) {
        if self.ringing {
            self.ringing = false;
            push(actions, Action::Vibrate(self.config.vibration.call));
        }

        if let Some(voltage_mv) = inputs.voltage_mv {
            self.measure_battery(inputs.now, voltage_mv, actions);
        }

        let frame = FrameInputs {
            now: inputs.now,
            connected: self.connected,
            ring: self.notifications.cursor(),
        };
        if let Some(plan) = self.display.plan(&frame) {
            self.pending_frame = Some(frame);
            push(actions, Action::Redraw(plan));
        }
    }

    fn measure_battery(&mut self, now: Option<NaiveDateTime>, voltage_mv: u16, actions: &mut Actions) {
        // The discharge estimate needs a trustworthy clock
        if let Some(now) = now {
            let now_s = now.and_utc().timestamp().clamp(0, i64::from(u32::MAX)) as u32;
            let minute_of_day = (now.hour() * 60 + now.minute()) as u16;
            if let Some(block) = self.battery.measure(now_s, minute_of_day, voltage_mv) {
                let slot = self.log_ring.append();
                push(actions, Action::PersistLog { slot, block });
            }
        }

        let level = self.battery.level(voltage_mv);
        if self.last_reported_level != Some(level) {
            self.report_battery(level, actions);
        }
    }

    fn report_battery(&mut self, level: u8, actions: &mut Actions) {
        if self.connected && self.subscribed {
            push(
                actions,
                Action::SendBattery {
                    level,
                    charging: self.battery.is_charging(),
                },
            );
            self.last_reported_level = Some(level);
        }
    }

    /// The redraw from the last idle pass reached the panel
    pub fn commit_redraw(&mut self, plan: &RedrawPlan) {
        if let Some(frame) = self.pending_frame.take() {
            self.display.commit(plan, &frame);
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn notifications(&self) -> &NotificationRing<N> {
        &self.notifications
    }

    pub fn battery(&self) -> &BatteryEstimator {
        &self.battery
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// A call is ringing and will buzz again on the next idle pass
    pub fn is_ringing(&self) -> bool {
        self.ringing
    }

    /// State to stash before a warm reset
    pub fn retained(&self, boot_time_s: u32) -> RetainedState {
        self.display.retained(boot_time_s)
    }
}
