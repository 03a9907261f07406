//! Console output for the shell.
//!
//! All user-facing text goes through one [`ShellWriter`] so the verbose
//! and porcelain switches apply everywhere, and so tests can capture
//! output instead of scraping stdout. Clones share the capture sink.

use std::cell::RefCell;
use std::rc::Rc;

use colored::Colorize;

/// Verbosity-aware writer with an optional capture sink.
///
/// Line categories map to the CLI switches: `debug` lines appear only
/// under `--verbose`, `info` lines are silenced by `--porcelain`, plain
/// and error lines always come through. Colors are applied only when
/// printing to a terminal, never to captured text.
#[derive(Clone, Default)]
pub struct ShellWriter {
    verbose: bool,
    porcelain: bool,
    capture: Option<Rc<RefCell<Vec<String>>>>,
}

impl ShellWriter {
    /// A writer configured from the CLI switches.
    pub fn new(verbose: bool, porcelain: bool) -> ShellWriter {
        ShellWriter {
            verbose,
            porcelain,
            capture: None,
        }
    }

    /// A verbose writer that records lines instead of printing them.
    pub fn captured(sink: Rc<RefCell<Vec<String>>>) -> ShellWriter {
        ShellWriter {
            verbose: true,
            porcelain: false,
            capture: Some(sink),
        }
    }

    /// Whether `--verbose` was given.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// A user-facing line. Always emitted.
    pub fn write_line(&self, line: &str) {
        self.emit(line, None);
    }

    /// A status line, silenced by `--porcelain`.
    pub fn info_line(&self, line: &str) {
        if !self.porcelain {
            self.emit(line, None);
        }
    }

    /// A diagnostic line, emitted only under `--verbose` and silenced by
    /// `--porcelain`.
    pub fn debug_line(&self, line: &str) {
        if self.verbose && !self.porcelain {
            self.emit(line, None);
        }
    }

    /// A warning line, silenced by `--porcelain`.
    pub fn warn_line(&self, line: &str) {
        if !self.porcelain {
            self.emit(line, Some(Color::Yellow));
        }
    }

    /// An error line. Always emitted.
    pub fn error_line(&self, line: &str) {
        self.emit(line, Some(Color::Red));
    }

    /// One error line per entry, for stacks and load chains.
    pub fn error_lines<S: AsRef<str>>(&self, lines: &[S]) {
        for line in lines {
            self.error_line(line.as_ref());
        }
    }

    fn emit(&self, line: &str, color: Option<Color>) {
        if let Some(capture) = &self.capture {
            capture.borrow_mut().push(line.to_string());
            return;
        }
        match color {
            Some(Color::Red) => eprintln!("{}", line.red()),
            Some(Color::Yellow) => eprintln!("{}", line.yellow()),
            None => println!("{}", line),
        }
    }
}

enum Color {
    Red,
    Yellow,
}
