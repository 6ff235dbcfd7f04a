//! Bounded event queue
//!
//! Many producers (button tasks, link receive task) post events without
//! blocking; the main loop is the single consumer. When the queue is full
//! the new event is dropped and counted. Protocol fragments never pass
//! through here: they are reassembled by the link task first.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use portable_atomic::{AtomicU32, Ordering};

use crate::state::Event;

/// Default queue depth
pub const EVENT_QUEUE_SIZE: usize = 16;

/// Lossy multi-producer, single-consumer event queue
pub struct EventQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, Event, N>,
    dropped: AtomicU32,
}

impl<M: RawMutex, const N: usize> Default for EventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> EventQueue<M, N> {
    /// Create an empty queue (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Post an event without blocking
    ///
    /// On overflow the event is handed back and the drop counter
    /// incremented; callers usually just log it.
    pub fn post(&self, event: Event) -> Result<(), Event> {
        self.channel.try_send(event).map_err(|TrySendError::Full(event)| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            event
        })
    }

    /// Wait for the next event
    pub async fn next(&self) -> Event {
        self.channel.receive().await
    }

    /// Take the next event if one is waiting
    pub fn try_next(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Number of events dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of events waiting
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Button;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_fifo_order() {
        let queue: EventQueue<NoopRawMutex, 4> = EventQueue::new();
        queue.post(Event::ClientConnected).unwrap();
        queue.post(Event::ButtonPressed(Button::Up)).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(block_on(queue.next()), Event::ClientConnected);
        assert_eq!(block_on(queue.next()), Event::ButtonPressed(Button::Up));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let queue: EventQueue<NoopRawMutex, 2> = EventQueue::new();
        queue.post(Event::ClientConnected).unwrap();
        queue.post(Event::ClientSubscribed).unwrap();

        assert_eq!(queue.post(Event::ClientFind), Err(Event::ClientFind));
        assert_eq!(queue.post(Event::ClientFind), Err(Event::ClientFind));
        assert_eq!(queue.dropped(), 2);

        // Queued events are untouched
        assert_eq!(queue.try_next(), Some(Event::ClientConnected));
        assert_eq!(queue.try_next(), Some(Event::ClientSubscribed));
        assert_eq!(queue.try_next(), None);

        // Space again after draining
        assert!(queue.post(Event::ClientFind).is_ok());
    }
}
