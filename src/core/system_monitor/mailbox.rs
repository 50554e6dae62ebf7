//! Single-slot, latest-value-wins hand-off between a sampler and the consumer.
//!
//! A publish never waits: if the consumer has not taken the previous value
//! yet, it is replaced. A take never waits either: an empty slot returns
//! `None` and the consumer keeps the last value it already merged.

use std::sync::Arc;

use parking_lot::Mutex;

pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Store `value`, overwriting any unread one. Returns true if a value was dropped.
    pub fn publish(&self, value: T) -> bool {
        self.slot.lock().replace(value).is_some()
    }

    /// Take the unread value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
