//! The micro-task queue driving playback and test execution.
//!
//! Tasks are ordered by deadline on the virtual clock, with submission
//! order breaking ties, so draining the queue is fully deterministic.
//! Callbacks receive the queue itself and may schedule further work,
//! which joins the same drain when it falls inside the run's budgets.

use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::rc::Rc;

use crate::clock::VirtualClock;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// A shared flag that asks a running queue to halt between ticks.
///
/// Clones observe the same flag, so a handle captured by a task callback
/// can stop the drain that is executing it.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Rc<Cell<bool>>,
}

impl StopSignal {
    /// A signal that is not yet raised.
    pub fn new() -> StopSignal {
        StopSignal {
            flag: Rc::new(Cell::new(false)),
        }
    }

    /// Raises the signal. The queue stops before its next tick.
    pub fn request_stop(&self) {
        self.flag.set(true);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.get()
    }

    /// Lowers the signal so the queue can run again.
    pub fn clear(&self) {
        self.flag.set(false);
    }
}

struct ScheduledTask {
    id: u64,
    run_at: u64,
    order: u64,
    interval: Option<u64>,
    callback: Box<dyn FnMut(&mut MicroTaskQueue)>,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.run_at == other.run_at && self.order == other.order
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.run_at, self.order).cmp(&(other.run_at, other.order))
    }
}

/// A deterministic single-threaded task queue on a [`VirtualClock`].
pub struct MicroTaskQueue {
    heap: BinaryHeap<Reverse<ScheduledTask>>,
    clock: VirtualClock,
    next_id: u64,
    next_order: u64,
    stop: StopSignal,
    cancelled: HashSet<u64>,
}

impl MicroTaskQueue {
    /// An empty queue with the clock at zero.
    pub fn new() -> MicroTaskQueue {
        MicroTaskQueue {
            heap: BinaryHeap::new(),
            clock: VirtualClock::new(),
            next_id: 0,
            next_order: 0,
            stop: StopSignal::new(),
            cancelled: HashSet::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Schedules `callback` to run once, `delay_ms` after the current
    /// virtual time.
    pub fn schedule(
        &mut self,
        delay_ms: u64,
        callback: impl FnMut(&mut MicroTaskQueue) + 'static,
    ) -> TaskId {
        self.push_task(delay_ms, None, Box::new(callback))
    }

    /// Schedules `callback` to run every `interval_ms`, starting one
    /// interval from the current virtual time.
    pub fn schedule_interval(
        &mut self,
        interval_ms: u64,
        callback: impl FnMut(&mut MicroTaskQueue) + 'static,
    ) -> TaskId {
        self.push_task(interval_ms, Some(interval_ms), Box::new(callback))
    }

    fn push_task(
        &mut self,
        delay_ms: u64,
        interval: Option<u64>,
        callback: Box<dyn FnMut(&mut MicroTaskQueue)>,
    ) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        let order = self.next_order;
        self.next_order += 1;
        self.heap.push(Reverse(ScheduledTask {
            id,
            run_at: self.clock.now_ms() + delay_ms,
            order,
            interval,
            callback,
        }));
        TaskId(id)
    }

    /// Cancels a task. Safe to call from inside the task's own callback;
    /// an interval cancelled mid-tick is not rescheduled.
    pub fn cancel(&mut self, id: TaskId) {
        self.cancelled.insert(id.0);
    }

    /// Drops every scheduled task.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.cancelled.clear();
    }

    /// Number of tasks still scheduled.
    pub fn len(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(task)| !self.cancelled.contains(&task.id))
            .count()
    }

    /// Whether no tasks remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A handle onto this queue's stop flag.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Asks the current drain to halt before its next tick.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Drains the queue until a budget is hit, a stop is requested, or no
    /// tasks remain. Returns the number of ticks executed.
    ///
    /// `duration_budget_ms` bounds virtual elapsed time: a task runs only
    /// if its deadline falls strictly inside the budget window measured
    /// from the clock at entry. `count_budget` bounds the number of
    /// ticks. Zero disables either budget.
    ///
    /// A pending stop from an earlier drain is cleared on entry.
    pub fn run(&mut self, duration_budget_ms: u64, count_budget: u64) -> u64 {
        self.stop.clear();
        let started_at = self.clock.now_ms();
        let mut ticks = 0u64;
        loop {
            if self.stop.is_stopped() {
                break;
            }
            if count_budget != 0 && ticks >= count_budget {
                break;
            }
            let Some(Reverse(mut task)) = self.heap.pop() else {
                break;
            };
            if self.cancelled.remove(&task.id) {
                continue;
            }
            if duration_budget_ms != 0
                && task.run_at.saturating_sub(started_at) >= duration_budget_ms
            {
                // Belongs to a later window, leave it scheduled.
                self.heap.push(Reverse(task));
                break;
            }
            self.clock.advance_to(task.run_at);
            (task.callback)(self);
            ticks += 1;
            let cancelled_during_tick = self.cancelled.remove(&task.id);
            if let Some(interval) = task.interval {
                if !cancelled_during_tick {
                    task.run_at += interval;
                    task.order = self.next_order;
                    self.next_order += 1;
                    self.heap.push(Reverse(task));
                }
            }
        }
        ticks
    }
}

impl Default for MicroTaskQueue {
    fn default() -> Self {
        MicroTaskQueue::new()
    }
}
