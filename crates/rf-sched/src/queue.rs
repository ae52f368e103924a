//! Cancellable timer queue driven by an explicit clock

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use log::debug;

/// Handle to a scheduled action. Stays valid until the entry fires, is
/// cancelled individually, or the queue is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<T> {
    due_ms: f64,
    seq: u64,
    id: TimerId,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the std max-heap pops the earliest (due, seq) first.
        // Equal deadlines fire in scheduling order.
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of deferred actions ordered by `(due_ms, scheduling order)`.
///
/// Scheduling is legal from inside a drain loop: an entry scheduled with zero
/// delay while draining becomes due immediately and fires within the same
/// drain. Cancellation is lazy — cancelled entries stay in the heap but are
/// skipped and dropped when they surface.
pub struct TimerQueue<T> {
    now_ms: f64,
    next_seq: u64,
    heap: BinaryHeap<Entry<T>>,
    live: HashSet<TimerId>,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            heap: BinaryHeap::new(),
            live: HashSet::new(),
        }
    }

    /// Current clock value in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of live (scheduled, not yet fired or cancelled) entries.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Schedule `payload` to become due `delay_ms` from now. Negative delays
    /// are clamped to zero (due immediately).
    pub fn schedule(&mut self, delay_ms: f64, payload: T) -> TimerId {
        let delay = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.heap.push(Entry {
            due_ms: self.now_ms + delay,
            seq,
            id,
            payload,
        });
        self.live.insert(id);
        id
    }

    /// Cancel a single entry. Returns false if the id already fired, was
    /// cancelled before, or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    /// Drop every pending entry. This is the bulk-cancellation primitive
    /// backing teardown: after `clear()` no previously scheduled entry can
    /// ever fire, and all outstanding ids are dead.
    pub fn clear(&mut self) {
        if !self.live.is_empty() {
            debug!("timer queue cleared, dropping {} pending entries", self.live.len());
        }
        self.heap.clear();
        self.live.clear();
    }

    /// Advance the clock. Non-positive or non-finite deltas are ignored; the
    /// clock never moves backward.
    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
    }

    /// Remove and return the earliest entry whose deadline has passed, or
    /// `None` when nothing is due yet. Call in a loop to drain a frame.
    pub fn pop_due(&mut self) -> Option<(TimerId, T)> {
        loop {
            let fire = match self.heap.peek() {
                // Lazily discard cancelled entries when they surface.
                Some(top) if !self.live.contains(&top.id) => false,
                Some(top) if top.due_ms <= self.now_ms => true,
                _ => return None,
            };
            let entry = self.heap.pop()?;
            if fire {
                self.live.remove(&entry.id);
                return Some((entry.id, entry.payload));
            }
        }
    }

    /// Deadline of the earliest live entry, if any.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.heap
            .iter()
            .filter(|e| self.live.contains(&e.id))
            .map(|e| e.due_ms)
            .fold(None, |acc, due| match acc {
                Some(best) if best <= due => Some(best),
                _ => Some(due),
            })
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
