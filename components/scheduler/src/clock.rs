//! The virtual clock that replaces wall time.

/// A monotonically advancing millisecond clock under program control.
///
/// Nothing reads the host clock: time only moves when the queue advances
/// it to a task's deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualClock {
    current_ms: u64,
}

impl VirtualClock {
    /// A clock at zero milliseconds.
    pub fn new() -> VirtualClock {
        VirtualClock { current_ms: 0 }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.current_ms
    }

    /// Moves the clock forward to `ms`. Earlier times are ignored, the
    /// clock never runs backward.
    pub fn advance_to(&mut self, ms: u64) {
        if ms > self.current_ms {
            self.current_ms = ms;
        }
    }
}
