//! Embassy async tasks
//!
//! Producers (buttons, link RX) only post events; the watch task owns the
//! application state and every peripheral it acts on.

pub mod buttons;
pub mod link;
pub mod watch;

pub use buttons::button_task;
pub use link::{link_rx_task, link_tx_task};
pub use watch::{watch_task, Watch};
