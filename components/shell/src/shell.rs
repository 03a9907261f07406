//! The shell orchestrator.
//!
//! One [`Shell`] owns everything the original kept in process-wide
//! globals: the virtual machine, the pending-test queue, the shared
//! presentation state, the playback budgets, and the ever-failed flag
//! that decides the process exit status. The CLI drives exactly one
//! shell, one file at a time.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use bytecode::BytecodeModule;
use player::PresentationState;
use vm::{Namespace, VmInstance};

use crate::bootstrap::{bootstrap, BootstrapOptions};
use crate::dispatch::FileKind;
use crate::error::{ShellError, ShellResult};
use crate::test_runner::PendingTest;
use crate::writer::ShellWriter;

/// The execution harness: owns the VM, the test queue, and the
/// presentation state shared with the player.
pub struct Shell {
    writer: ShellWriter,
    vm: Option<VmInstance>,
    pending_tests: VecDeque<PendingTest>,
    ever_failed: bool,
    presentation: Rc<RefCell<PresentationState>>,
    duration_budget_ms: u64,
    count_budget: u64,
}

impl Shell {
    /// A shell with no virtual machine and unbounded playback budgets.
    pub fn new(writer: ShellWriter) -> Shell {
        Shell {
            writer,
            vm: None,
            pending_tests: VecDeque::new(),
            ever_failed: false,
            presentation: Rc::new(RefCell::new(PresentationState::new())),
            duration_budget_ms: 0,
            count_budget: 0,
        }
    }

    /// Sets the playback budgets. Zero leaves an axis unbounded; an
    /// all-zero pair makes a looping movie run until it quits itself.
    pub fn set_budgets(&mut self, duration_budget_ms: u64, count_budget: u64) {
        self.duration_budget_ms = duration_budget_ms;
        self.count_budget = count_budget;
    }

    /// The configured duration budget in virtual milliseconds.
    pub fn duration_budget_ms(&self) -> u64 {
        self.duration_budget_ms
    }

    /// The configured tick-count budget.
    pub fn count_budget(&self) -> u64 {
        self.count_budget
    }

    /// The shell's writer.
    pub fn writer(&self) -> &ShellWriter {
        &self.writer
    }

    /// Bootstraps the virtual machine and installs it on the shell.
    pub fn bootstrap(&mut self, options: &BootstrapOptions) -> ShellResult<()> {
        let vm = bootstrap(options, &self.writer)?;
        self.vm = Some(vm);
        Ok(())
    }

    /// Installs an externally built instance, replacing any current one.
    pub fn install_vm(&mut self, vm: VmInstance) {
        self.vm = Some(vm);
    }

    /// The current virtual machine, if one was bootstrapped.
    pub fn vm(&self) -> Option<&VmInstance> {
        self.vm.as_ref()
    }

    /// Mutable access to the current virtual machine.
    pub fn vm_mut(&mut self) -> ShellResult<&mut VmInstance> {
        self.vm.as_mut().ok_or(ShellError::NotBootstrapped)
    }

    /// The presentation state shared with playback sessions.
    pub fn presentation(&self) -> &Rc<RefCell<PresentationState>> {
        &self.presentation
    }

    /// Whether any unit test has failed during this shell's lifetime.
    pub fn ever_failed(&self) -> bool {
        self.ever_failed
    }

    /// Records a unit-test failure for the final exit status.
    pub(crate) fn note_test_failure(&mut self) {
        self.ever_failed = true;
    }

    /// Appends one test to the pending queue.
    pub fn enqueue_test(&mut self, test: PendingTest) {
        self.pending_tests.push_back(test);
    }

    /// Appends tests to the pending queue in order.
    pub fn enqueue_tests(&mut self, tests: Vec<PendingTest>) {
        self.pending_tests.extend(tests);
    }

    /// Takes the next pending test, FIFO.
    pub(crate) fn dequeue_test(&mut self) -> Option<PendingTest> {
        self.pending_tests.pop_front()
    }

    /// Number of tests waiting in the queue.
    pub fn pending_test_count(&self) -> usize {
        self.pending_tests.len()
    }

    /// Routes one input file to its execution strategy.
    ///
    /// Failures are contained per file: the error is reported with its
    /// stack and `false` comes back, but the caller's loop continues.
    /// Unrecognized suffixes are a successful no-op; the file is never
    /// read.
    pub fn execute_file(&mut self, path: &Path) -> bool {
        match FileKind::classify(path) {
            FileKind::ScriptTest => match self.run_test_file(path) {
                Ok(_) => true,
                Err(error) => self.report_file_failure(path, &error),
            },
            FileKind::RawBytecode => {
                self.writer.debug_line(&format!("Running ABC: {}", path.display()));
                match self.execute_module_file(path) {
                    Ok(()) => true,
                    Err(error) => self.report_file_failure(path, &error),
                }
            }
            FileKind::PackagedContainer => match self.play(path) {
                Ok(()) => true,
                Err(error) => self.report_file_failure(path, &error),
            },
            FileKind::Unrecognized => true,
        }
    }

    /// Reads, parses, and executes a bytecode module in the application
    /// namespace. Used by the `.abc` dispatch path and by `run`
    /// directives in test scripts.
    pub fn execute_module_file(&mut self, path: &Path) -> ShellResult<()> {
        let bytes = std::fs::read(path).map_err(|error| ShellError::io(path, error))?;
        let module = BytecodeModule::parse(&bytes, &path.display().to_string())?;
        self.vm_mut()?.execute_in(Namespace::Application, &module)?;
        Ok(())
    }

    fn report_file_failure(&mut self, path: &Path, error: &ShellError) -> bool {
        self.writer
            .error_line(&format!("{}: {}", path.display(), error));
        self.writer.error_lines(error.stack());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tempfile::TempDir;
    use vm::ExecutionMode;

    fn captured_shell() -> (Shell, Rc<RefCell<Vec<String>>>) {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let mut shell = Shell::new(ShellWriter::captured(Rc::clone(&sink)));
        shell.install_vm(VmInstance::new(
            ExecutionMode::Compile,
            ExecutionMode::Compile,
        ));
        (shell, sink)
    }

    fn module_bytes(name: &str, defs: &[&str], refs: &[&str]) -> Vec<u8> {
        BytecodeModule::new(
            name,
            defs.iter().map(|s| s.to_string()).collect(),
            refs.iter().map(|s| s.to_string()).collect(),
            vec![0x01],
        )
        .to_bytes()
    }

    #[test]
    fn unrecognized_files_are_a_silent_no_op() {
        let (mut shell, sink) = captured_shell();

        // The path does not exist; classification must not read it.
        assert!(shell.execute_file(Path::new("/nonexistent/x.unknown")));
        assert!(sink.borrow().is_empty());
    }

    #[test]
    fn a_bytecode_file_executes_in_the_application_namespace() {
        let (mut shell, _) = captured_shell();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.abc");
        std::fs::write(&path, module_bytes("demo", &["demo.Main"], &[])).unwrap();

        assert!(shell.execute_file(&path));

        let name = path.display().to_string();
        assert_eq!(
            shell.vm().unwrap().definition_of(Namespace::Application, "demo.Main"),
            Some(name.as_str())
        );
    }

    #[test]
    fn a_failing_bytecode_file_reports_and_returns_false() {
        let (mut shell, sink) = captured_shell();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.abc");
        std::fs::write(&path, module_bytes("broken", &[], &["no.Such"])).unwrap();

        assert!(!shell.execute_file(&path));

        let lines = sink.borrow();
        assert!(lines.iter().any(|line| line.contains("no.Such")));
        // Per-file failures never touch the unit-test flag.
        drop(lines);
        assert!(!shell.ever_failed());
    }

    #[test]
    fn a_failure_does_not_poison_the_next_file() {
        let (mut shell, _) = captured_shell();
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.abc");
        std::fs::write(&bad, b"garbage").unwrap();
        let good = dir.path().join("good.abc");
        std::fs::write(&good, module_bytes("good", &["g.G"], &[])).unwrap();

        assert!(!shell.execute_file(&bad));
        assert!(shell.execute_file(&good));
    }

    #[test]
    fn executing_without_a_vm_is_contained() {
        let sink = Rc::new(RefCell::new(Vec::new()));
        let mut shell = Shell::new(ShellWriter::captured(Rc::clone(&sink)));
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.abc");
        std::fs::write(&path, module_bytes("demo", &["demo.Main"], &[])).unwrap();

        assert!(!shell.execute_file(&path));
        assert!(sink.borrow().iter().any(|line| line.contains("bootstrap")));
    }
}
