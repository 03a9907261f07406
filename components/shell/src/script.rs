//! The test-script directive grammar.
//!
//! A script is line-oriented: one directive per line, `#` comments and
//! blank lines ignored. Loading a script produces [`PendingTest`]
//! entries; it never runs anything itself.
//!
//! ```text
//! repeat <n>           repeat count for the next test directive (0 disables it)
//! run <path>           passes iff executing the module at <path> succeeds
//! expect-error <path>  passes iff executing the module at <path> fails
//! load <path>          enqueues the tests of another script
//! ```
//!
//! Paths resolve against the directory of the script that names them.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{ShellError, ShellResult};
use crate::test_runner::PendingTest;

/// Reads a script from disk and parses it into pending tests.
pub fn load_script(path: &Path) -> ShellResult<Vec<PendingTest>> {
    let source = std::fs::read_to_string(path).map_err(|error| ShellError::io(path, error))?;
    parse_script(path, &source)
}

/// Parses script `source`, resolving paths against `path`'s directory.
///
/// An unknown or malformed directive fails the whole script; that is a
/// per-file failure for the dispatcher, not a test failure.
pub fn parse_script(path: &Path, source: &str) -> ShellResult<Vec<PendingTest>> {
    let directive = Regex::new(r"^([a-z-]+)\s+(\S+)$").expect("directive pattern is valid");
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut tests = Vec::new();
    let mut repeat: Option<u32> = None;
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad = |message: String| ShellError::Script {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };
        let captures = directive
            .captures(line)
            .ok_or_else(|| bad(format!("malformed directive '{}'", line)))?;
        let keyword = captures.get(1).map_or("", |m| m.as_str());
        let argument = captures.get(2).map_or("", |m| m.as_str());
        match keyword {
            "repeat" => {
                let count: u32 = argument
                    .parse()
                    .map_err(|_| bad(format!("invalid repeat count '{}'", argument)))?;
                repeat = Some(count);
            }
            "run" => {
                let target = base.join(argument);
                tests.push(PendingTest {
                    name: line.to_string(),
                    repeat: repeat.take().unwrap_or(1),
                    run: Box::new(move |shell| shell.execute_module_file(&target)),
                });
            }
            "expect-error" => {
                let target = base.join(argument);
                tests.push(PendingTest {
                    name: line.to_string(),
                    repeat: repeat.take().unwrap_or(1),
                    run: Box::new(move |shell| match shell.execute_module_file(&target) {
                        Ok(()) => Err(ShellError::UnexpectedSuccess {
                            path: target.clone(),
                        }),
                        Err(_) => Ok(()),
                    }),
                });
            }
            "load" => {
                // The loaded script's tests join the live queue, so they
                // are drained by the run that is already in progress.
                let target = base.join(argument);
                tests.push(PendingTest {
                    name: line.to_string(),
                    repeat: repeat.take().unwrap_or(1),
                    run: Box::new(move |shell| {
                        let loaded = load_script(&target)?;
                        shell.enqueue_tests(loaded);
                        Ok(())
                    }),
                });
            }
            other => return Err(bad(format!("unknown directive '{}'", other))),
        }
    }
    Ok(tests)
}
