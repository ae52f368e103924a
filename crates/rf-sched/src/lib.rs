//! # rf-sched — Deferred-Action Scheduler
//!
//! A deterministic, cancellable timer queue for single-threaded choreography.
//! The queue never touches wall-clock time: the owner advances an explicit
//! millisecond clock (normally once per render frame) and drains whatever has
//! become due. Payloads are plain data, which keeps choreography data-driven
//! and lets tests run a full timeline without waiting on real time.
//!
//! ```
//! use rf_sched::TimerQueue;
//!
//! let mut queue: TimerQueue<&str> = TimerQueue::new();
//! queue.schedule(200.0, "start");
//! queue.schedule(900.0, "stop");
//!
//! queue.advance(250.0);
//! assert_eq!(queue.pop_due().map(|(_, p)| p), Some("start"));
//! assert_eq!(queue.pop_due(), None);
//! ```

mod queue;

pub use queue::{TimerId, TimerQueue};
