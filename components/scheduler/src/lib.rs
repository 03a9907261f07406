//! Deterministic task scheduling on a virtual clock.
//!
//! The shell never sleeps: timers are ordered by a [`VirtualClock`] that
//! jumps straight to each task's deadline, so a run over the same input
//! produces the same interleaving every time, regardless of host load.
//!
//! # Example
//!
//! ```
//! use scheduler::MicroTaskQueue;
//!
//! let mut queue = MicroTaskQueue::new();
//! queue.schedule(25, |_| {});
//! queue.schedule(10, |_| {});
//! let ticks = queue.run(0, 0);
//! assert_eq!(ticks, 2);
//! assert_eq!(queue.now_ms(), 25);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod queue;

pub use clock::VirtualClock;
pub use queue::{MicroTaskQueue, StopSignal, TaskId};
