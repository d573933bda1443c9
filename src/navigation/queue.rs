//! Bounded FIFO of planned maneuvers
//!
//! Fixed-capacity ring buffer: pop-front is O(1) and nothing is allocated
//! after construction.

use super::action::{ActionKind, TimedAction};

/// Default queue capacity (planners emit at most three steps)
pub const QUEUE_CAPACITY: usize = 6;

const EMPTY: TimedAction = TimedAction::new(ActionKind::None, 0);

/// Fixed-capacity action FIFO
///
/// Generic const parameter `N` sets capacity.
#[derive(Debug, Clone)]
pub struct ActionQueue<const N: usize = QUEUE_CAPACITY> {
    data: [TimedAction; N],
    head: usize, // Next empty slot
    tail: usize, // First queued action
    len: usize,
    overflow_count: u32,
}

impl<const N: usize> ActionQueue<N> {
    pub const fn new() -> Self {
        Self {
            data: [EMPTY; N],
            head: 0,
            tail: 0,
            len: 0,
            overflow_count: 0,
        }
    }

    /// Drop every queued action (the overflow count is kept)
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Append an action, returns false if the queue is full
    pub fn push(&mut self, action: TimedAction) -> bool {
        if self.len >= N {
            self.overflow_count = self.overflow_count.saturating_add(1);
            log::error!(
                "Action queue full ({} entries), dropping {:?}",
                N,
                action.kind
            );
            return false;
        }
        self.data[self.head] = action;
        self.head = (self.head + 1) % N;
        self.len += 1;
        true
    }

    /// Remove the oldest action
    #[inline]
    pub fn pop(&mut self) -> Option<TimedAction> {
        if self.len == 0 {
            return None;
        }
        let action = self.data[self.tail];
        self.tail = (self.tail + 1) % N;
        self.len -= 1;
        Some(action)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rejected pushes since construction
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    /// Queued actions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TimedAction> + '_ {
        (0..self.len).map(move |i| &self.data[(self.tail + i) % N])
    }
}

impl<const N: usize> Default for ActionQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
