//! The deterministic playback driver.
//!
//! One playback session is one queue, one player, one event sink. The
//! shared presentation state is reset before every session so
//! consecutive playbacks never see each other's display roots or clip
//! bindings.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use core_types::DataBuffer;
use player::{Player, PlayerEventSink};
use scheduler::{MicroTaskQueue, StopSignal};

use crate::error::ShellResult;
use crate::shell::Shell;

/// The shell's side of the playback protocol.
///
/// Synchronous update flushes answer a canned zero-metrics reply so
/// headless measurement has something to read; asynchronous flushes are
/// dropped. The one host command the shell understands is `quit`, which
/// raises the queue's stop signal so the pump halts before its next
/// tick.
pub(crate) struct ShellEventSink {
    stop: StopSignal,
}

impl ShellEventSink {
    pub(crate) fn new(stop: StopSignal) -> ShellEventSink {
        ShellEventSink { stop }
    }
}

impl PlayerEventSink for ShellEventSink {
    fn on_send_updates(
        &mut self,
        _updates: &DataBuffer,
        _assets: &[DataBuffer],
        sync: bool,
    ) -> Option<DataBuffer> {
        if !sync {
            return None;
        }
        // Simulated text metrics: width, height, offset, line count.
        let mut reply = DataBuffer::new();
        reply.write_i32(1);
        reply.write_i32(1);
        reply.write_i32(0);
        reply.write_i32(0);
        reply.set_position(0);
        Some(reply)
    }

    fn on_host_command(&mut self, command: &str, _args: &str) {
        if command == "quit" {
            self.stop.request_stop();
        }
    }
}

impl Shell {
    /// Plays one container file under the shell's budgets.
    ///
    /// Resets the shared presentation state, loads the container (its
    /// bytecode executes during the load), and pumps the micro-task
    /// queue until a budget is exhausted, the movie quits itself, or no
    /// work remains. Zero budgets are unbounded on their axis.
    pub fn play(&mut self, path: &Path) -> ShellResult<()> {
        self.presentation().borrow_mut().reset();

        let mut queue = MicroTaskQueue::new();
        let sink: Rc<RefCell<dyn PlayerEventSink>> =
            Rc::new(RefCell::new(ShellEventSink::new(queue.stop_signal())));
        let mut player = Player::new(Rc::clone(self.presentation()), sink);

        let vm = self.vm_mut()?;
        player.load_file(path, vm, &mut queue)?;

        self.writer().info_line(&format!("Running: {}", path.display()));
        queue.run(self.duration_budget_ms(), self.count_budget());
        Ok(())
    }
}
