//! Draining the pending-test queue.

use std::path::Path;
use std::time::Instant;

use crate::error::ShellResult;
use crate::script;
use crate::shell::Shell;

/// One queued unit test.
///
/// The closure receives the shell so tests can execute modules, and may
/// enqueue further tests; the queue is a work list, not a snapshot.
pub struct PendingTest {
    /// The directive line the test came from, for verbose output.
    pub name: String,
    /// How many times to invoke the closure. Zero disables the test.
    pub repeat: u32,
    /// The test body. Each `Err` counts as one failure.
    pub run: Box<dyn FnMut(&mut Shell) -> ShellResult<()>>,
}

impl std::fmt::Debug for PendingTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTest")
            .field("name", &self.name)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Loads a test script and drains the pending-test queue.
    ///
    /// Entries run strictly FIFO, each invoked `repeat` times; entries
    /// enqueued by a running test join the same drain. A failing
    /// invocation is reported and counted without stopping the
    /// remaining repeats or the remaining tests. Returns
    /// `(pass, fail)` counts per invocation; a script that fails to
    /// load is a file-level error instead.
    pub fn run_test_file(&mut self, path: &Path) -> ShellResult<(u32, u32)> {
        let writer = self.writer().clone();
        writer.write_line(&format!("Running test file: {} ...", path.display()));
        let started = Instant::now();

        let tests = script::load_script(path)?;
        self.enqueue_tests(tests);

        let mut passed = 0u32;
        let mut failed = 0u32;
        let mut invocations = 0u32;
        while let Some(mut test) = self.dequeue_test() {
            if !test.name.is_empty() {
                writer.debug_line(&format!("Test: {}", test.name));
            }
            invocations += test.repeat;
            for _ in 0..test.repeat {
                match (test.run)(self) {
                    Ok(()) => passed += 1,
                    Err(error) => {
                        failed += 1;
                        self.note_test_failure();
                        writer.error_line(&format!(
                            "Exception encountered while running {}: ({})",
                            path.display(),
                            error
                        ));
                        writer.error_lines(error.stack());
                    }
                }
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        writer.write_line(&format!(
            "Completed {} test{} in {:.2} ms.",
            invocations,
            if invocations == 1 { "" } else { "s" },
            elapsed_ms
        ));
        Ok((passed, failed))
    }
}
