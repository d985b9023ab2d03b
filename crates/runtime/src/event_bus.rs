use foundation::time::Time;

use crate::frame::Frame;

/// An outbound notification stamped with the frame that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub frame_index: u64,
    pub at: Time,
    pub payload: E,
}

/// Ordered outbox of typed events.
///
/// Producers `emit` during a frame; the host drains after the frame and
/// forwards payloads to whoever listens (the form wizard, a log, a test).
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<Event<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, payload: E) {
        self.emit_at(frame.index, frame.now, payload);
    }

    pub fn emit_at(&mut self, frame_index: u64, at: Time, payload: E) {
        self.events.push(Event {
            frame_index,
            at,
            payload,
        });
    }

    pub fn events(&self) -> &[Event<E>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        std::mem::take(&mut self.events)
    }
}
