//! Inter-task communication
//!
//! Button tasks and the link task post into one event queue; the watch
//! task is its only consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use inkwatch_core::state::Event;
use inkwatch_core::{EventQueue, EVENT_QUEUE_SIZE};
use inkwatch_protocol::MAX_RECORD_PAYLOAD;

/// Events for the watch task
pub static EVENTS: EventQueue<CriticalSectionRawMutex, EVENT_QUEUE_SIZE> = EventQueue::new();

/// Outbound notification payloads (watch task → link TX task)
pub static OUTBOUND: Channel<CriticalSectionRawMutex, heapless::Vec<u8, MAX_RECORD_PAYLOAD>, 4> =
    Channel::new();

/// Post an event, logging when it had to be dropped
pub fn post(event: Event) {
    if let Err(event) = EVENTS.post(event) {
        defmt::warn!("Event queue full, dropping {}", event);
    }
}
