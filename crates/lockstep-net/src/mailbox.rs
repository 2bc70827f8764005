//! The bounded mailbox spec.md §5 names as "the sole synchronization
//! point" between a transport thread and the single-threaded simulation.
//!
//! The transport pushes delivered messages in; the simulation drains them
//! between ticks, never mid-tick. A full mailbox drops the newest message
//! rather than blocking the transport thread or growing unbounded --
//! spec.md §5 explicitly allows discarding un-consumed messages on
//! shutdown, and the same "drop rather than stall" posture applies here.

use std::collections::VecDeque;

/// A fixed-capacity FIFO queue. `try_push` never blocks and never grows
/// past `capacity`.
#[derive(Debug)]
pub struct Mailbox<T> {
    queue: VecDeque<T>,
    capacity: usize,
}

impl<T> Mailbox<T> {
    pub fn new(capacity: usize) -> Self {
        Mailbox { queue: VecDeque::with_capacity(capacity), capacity }
    }

    /// Enqueue `item`. Returns `Err(item)` (handing the value back) if the
    /// mailbox is already at capacity.
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.queue.len() >= self.capacity {
            return Err(item);
        }
        self.queue.push_back(item);
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Remove and return every queued item, in FIFO order.
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }
}
