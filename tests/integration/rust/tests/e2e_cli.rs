//! End-to-end CLI tests.
//!
//! Each test builds input files in a temporary directory, runs the
//! driver exactly as the `vermeil` binary would, and checks the exit
//! code and the captured output.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use bytecode::BytecodeModule;
use clap::Parser;
use container::ContainerBuilder;
use shell::{run_with_writer, Cli, ShellWriter};
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("vermeil").chain(args.iter().copied())).unwrap()
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

struct Session {
    dir: TempDir,
    sink: Rc<RefCell<Vec<String>>>,
}

impl Session {
    fn new() -> Session {
        Session {
            dir: TempDir::new().unwrap(),
            sink: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn builtin(&self) -> PathBuf {
        self.file("builtin.abc", &module_bytes("builtin", &["host.Object"], &[]))
    }

    fn run(&self, args: &[&str]) -> i32 {
        run_with_writer(
            &cli(args),
            ShellWriter::captured(Rc::clone(&self.sink)),
        )
    }

    fn output(&self) -> Vec<String> {
        self.sink.borrow().clone()
    }
}

#[test]
fn test_execute_mode_runs_files_in_order() {
    let s = Session::new();
    let builtin = s.builtin();
    let first = s.file("first.abc", &module_bytes("first", &["a.A"], &[]));
    let second = s.file("second.abc", &module_bytes("second", &["b.B"], &["a.A"]));

    let code = s.run(&[
        "-x",
        "-v",
        "--builtin",
        builtin.to_str().unwrap(),
        first.to_str().unwrap(),
        second.to_str().unwrap(),
    ]);

    // second.abc links against a.A, which only resolves because
    // first.abc ran before it.
    assert_eq!(code, 0);
    assert_eq!(
        s.output()
            .iter()
            .filter(|line| line.starts_with("Running ABC:"))
            .count(),
        2
    );
}

#[test]
fn test_parse_and_execute_combine_in_one_invocation() {
    let s = Session::new();
    let builtin = s.builtin();
    let demo = s.file("demo.abc", &module_bytes("demo", &["d.D"], &[]));

    let code = s.run(&[
        "-p",
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        demo.to_str().unwrap(),
    ]);

    assert_eq!(code, 0);
    let output = s.output();
    assert!(output.iter().any(|line| line.starts_with("Parsing:")));
    assert!(output
        .iter()
        .any(|line| line.starts_with("Total Parse Time:")));
    assert!(output.iter().any(|line| line.starts_with("Running ABC:")));
}

#[test]
fn test_container_playback_respects_the_count_budget() {
    let s = Session::new();
    let builtin = s.builtin();
    let movie = s.file(
        "movie.swf",
        &ContainerBuilder::new().frame_rate(10).show_frame().build(),
    );

    let code = s.run(&[
        "-x",
        "--count",
        "4",
        "--builtin",
        builtin.to_str().unwrap(),
        movie.to_str().unwrap(),
    ]);

    assert_eq!(code, 0);
    assert!(s
        .output()
        .iter()
        .any(|line| line.starts_with("Running: ") && line.contains("movie.swf")));
}

#[test]
fn test_a_corrupt_container_fails_its_file_but_not_the_run() {
    let s = Session::new();
    let builtin = s.builtin();
    let junk = s.file("junk.swf", b"not a container");
    let good = s.file("good.abc", &module_bytes("good", &["g.G"], &[]));

    let code = s.run(&[
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        junk.to_str().unwrap(),
        good.to_str().unwrap(),
    ]);

    assert_eq!(code, 0);
    assert!(s.output().iter().any(|line| line.contains("junk.swf")));
}

#[test]
fn test_the_interpreter_flag_skips_verification() {
    let s = Session::new();
    let builtin = s.builtin();
    // Duplicate definitions fail verification but interpret fine.
    let sloppy = s.file("sloppy.abc", &module_bytes("sloppy", &["x.X", "x.X"], &[]));

    let strict = s.run(&[
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        sloppy.to_str().unwrap(),
    ]);
    let lax = s.run(&[
        "-x",
        "-i",
        "--builtin",
        builtin.to_str().unwrap(),
        sloppy.to_str().unwrap(),
    ]);

    assert_eq!(strict, 0);
    assert_eq!(lax, 0);
    // The strict pass reported a verification failure for the file.
    assert!(s.output().iter().any(|line| line.contains("sloppy.abc:")));
}

#[test]
fn test_script_failures_decide_the_exit_code_not_direct_files() {
    let s = Session::new();
    let builtin = s.builtin();
    s.file("broken.abc", &module_bytes("broken", &[], &["no.Such"]));
    let direct_broken = s.dir.path().join("broken.abc");
    let suite = s.file("suite.js", b"run broken.abc\n");

    // Direct execution of a broken file: reported, exit 0.
    let direct = s.run(&[
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        direct_broken.to_str().unwrap(),
    ]);
    assert_eq!(direct, 0);

    // The same file failing under a test script: exit 1.
    let scripted = s.run(&[
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        suite.to_str().unwrap(),
    ]);
    assert_eq!(scripted, 1);
    assert!(s
        .output()
        .iter()
        .any(|line| line == "Some unit tests failed"));
}

#[test]
fn test_a_malformed_script_directive_is_a_file_error_not_a_test_failure() {
    let s = Session::new();
    let builtin = s.builtin();
    let suite = s.file("suite.js", b"jump somewhere.abc\n");

    let code = s.run(&[
        "-x",
        "--builtin",
        builtin.to_str().unwrap(),
        suite.to_str().unwrap(),
    ]);

    // The script never loaded, so no test ran and no test failed.
    assert_eq!(code, 0);
    assert!(s
        .output()
        .iter()
        .any(|line| line.contains("suite.js") && line.contains(":1:")));
}
