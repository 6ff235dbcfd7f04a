//! Board-agnostic application logic for the Inkwatch e-paper watch
//!
//! This crate contains everything that does not touch hardware:
//!
//! - Events, screens and the event queue
//! - Notification ring buffer and filtering
//! - Battery level, discharge rate and log block bookkeeping
//! - Display refresh planning and warm-reset state
//! - Configuration types and the TOML fallback parser
//! - The dispatcher that ties them together ([`app::App`])

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod app;
pub mod battery;
pub mod config;
pub mod display;
pub mod input;
pub mod notifications;
pub mod queue;
pub mod state;

pub use app::{Action, Actions, App, IdleInputs, MAX_ACTIONS};
pub use queue::{EventQueue, EVENT_QUEUE_SIZE};
