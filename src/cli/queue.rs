//! Bounded FIFO used for the command and error queues.

use alloc::collections::VecDeque;

/// Queue capacity used by [`Cli::default`](super::Cli::default).
pub const DEFAULT_QUEUE_SIZE: usize = 10;

/// Bounded FIFO that evicts its oldest entry instead of rejecting a push.
///
/// Storage is reserved once at construction and never grows past the
/// capacity. Every eviction is counted, see [`dropped`](Self::dropped).
#[derive(Debug)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped: usize,
}

impl<T> BoundedQueue<T> {
    /// Create an empty queue holding at most `capacity` entries.
    ///
    /// A capacity of zero is allowed and drops every push.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append `item`, evicting and returning the oldest entry when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            self.dropped += 1;
            return Some(item);
        }

        let evicted = if self.items.len() >= self.capacity {
            self.dropped += 1;
            self.items.pop_front()
        } else {
            None
        };

        self.items.push_back(item);
        evicted
    }

    /// Remove and return the oldest entry.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// The oldest entry, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Remove every entry for which `take` returns `true`, handing each to it
    /// in FIFO order. Entries that are kept stay in their original order.
    pub fn drain_where<F>(&mut self, mut take: F)
    where
        F: FnMut(&T) -> bool,
    {
        let pending = self.items.len();
        for _ in 0..pending {
            let Some(item) = self.items.pop_front() else {
                break;
            };
            if !take(&item) {
                self.items.push_back(item);
            }
        }
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries lost to eviction since creation.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Iterate over the queued entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove every entry. Cleared entries do not count as dropped.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
