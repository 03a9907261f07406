//! Comprehensive End-to-End Shell Execution Tests
//!
//! Tests the complete execution stack: CLI flags -> bootstrap -> VM
//! namespaces -> dispatch -> playback / test scripts. Covers:
//! - Bootstrap staging (builtin, catalog, auxiliary library)
//! - Host-native symbol resolution from user modules
//! - Lazy catalog loading triggered by command-line modules
//! - Test-script chaining through `load`
//! - Playback budgets from the command line
//! - Porcelain output

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use bytecode::BytecodeModule;
use clap::Parser;
use container::ContainerBuilder;
use shell::{run_with_writer, Cli, Shell, ShellWriter};
use tempfile::TempDir;
use vm::Namespace;

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

    /// A one-chunk global library defining `lib.Point`.
    fn global_library(&self) -> (PathBuf, PathBuf) {
        let chunk = module_bytes("geom", &["lib.Point"], &[]);
        let chunks = self.file("global.abcs", &chunk);
        let catalog = self.file(
            "global.json",
            format!(
                r#"[{{"name": "geom", "defs": "lib.Point", "offset": 0, "length": {}}}]"#,
                chunk.len()
            )
            .as_bytes(),
        );
        (chunks, catalog)
    }

    fn writer(&self) -> ShellWriter {
        ShellWriter::captured(Rc::clone(&self.sink))
    }

    fn output(&self) -> Vec<String> {
        self.sink.borrow().clone()
    }
}

/// Test: host natives resolve from user modules without any library
/// defining them.
#[test]
fn test_host_natives_resolve_from_user_modules() {
    let s = Session::new();
    let builtin = s.builtin();
    let user = s.file(
        "user.abc",
        &module_bytes(
            "user",
            &["app.Main"],
            &["shell.print", "shell.quit", "shell.readBinaryFile", "shell.now"],
        ),
    );

    let code = run_with_writer(
        &cli(&[
            "-x",
            "--builtin",
            builtin.to_str().unwrap(),
            user.to_str().unwrap(),
        ]),
        s.writer(),
    );

    assert_eq!(code, 0);
}

/// Test: `-g` makes catalog symbols available to plain `.abc` files,
/// and the chunk loads lazily into the system namespace.
#[test]
fn test_explicit_global_library_serves_command_line_modules() {
    let s = Session::new();
    let builtin = s.builtin();
    let (chunks, catalog) = s.global_library();
    let user = s.file("user.abc", &module_bytes("user", &["app.Main"], &["lib.Point"]));

    let mut shell = Shell::new(s.writer());
    let parsed = cli(&[
        "-x",
        "-g",
        "--builtin",
        builtin.to_str().unwrap(),
        "--library-chunks",
        chunks.to_str().unwrap(),
        "--library-catalog",
        catalog.to_str().unwrap(),
    ]);
    shell.bootstrap(&parsed.bootstrap_options(true)).unwrap();

    // Nothing loads until a reference demands it.
    assert!(shell
        .vm()
        .unwrap()
        .executed_modules(Namespace::System)
        .iter()
        .all(|name| name != "geom"));

    assert!(shell.execute_file(&user));
    assert_eq!(
        shell.vm().unwrap().definition_of(Namespace::System, "lib.Point"),
        Some("geom")
    );
}

/// Test: the auxiliary library participates in symbol resolution for
/// everything executed after bootstrap.
#[test]
fn test_the_auxiliary_library_serves_user_modules() {
    let s = Session::new();
    let builtin = s.builtin();
    let aux = s.file("shell.abc", &module_bytes("aux", &["shell.Tools"], &[]));
    let user = s.file("user.abc", &module_bytes("user", &["app.Main"], &["shell.Tools"]));

    let code = run_with_writer(
        &cli(&[
            "-x",
            "-s",
            "--builtin",
            builtin.to_str().unwrap(),
            "--aux-lib",
            aux.to_str().unwrap(),
            user.to_str().unwrap(),
        ]),
        s.writer(),
    );

    assert_eq!(code, 0);
    assert!(!s.output().iter().any(|line| line.contains("shell.Tools")));
}

/// Test: a script chain via `load` drains in one pass and the summary
/// counts every invocation.
#[test]
fn test_loaded_scripts_chain_into_one_drain() {
    let s = Session::new();
    let builtin = s.builtin();
    s.file("leaf.abc", &module_bytes("leaf", &["t.Leaf"], &[]));
    s.file("inner.js", b"run leaf.abc\n");
    let outer = s.file("outer.js", b"load inner.js\nrun leaf.abc\n");

    let code = run_with_writer(
        &cli(&[
            "-x",
            "--builtin",
            builtin.to_str().unwrap(),
            outer.to_str().unwrap(),
        ]),
        s.writer(),
    );

    assert_eq!(code, 0);
    // load itself, the inner run, and the outer run.
    assert!(s
        .output()
        .iter()
        .any(|line| line.starts_with("Completed 3 tests")));
}

/// Test: the duration budget from the command line bounds playback in
/// virtual time.
#[test]
fn test_duration_budget_bounds_playback() {
    let s = Session::new();
    let builtin = s.builtin();
    let movie = s.file(
        "movie.swf",
        &ContainerBuilder::new().frame_rate(10).show_frame().build(),
    );

    let mut shell = Shell::new(s.writer());
    shell.set_budgets(250, 0);
    shell
        .bootstrap(
            &cli(&["-x", "--builtin", builtin.to_str().unwrap()]).bootstrap_options(false),
        )
        .unwrap();

    assert!(shell.execute_file(&movie));

    // 100 ms per tick under a 250 ms budget: ticks at 100 and 200.
    assert_eq!(shell.presentation().borrow().display_roots()[0].frames_played, 2);
}

/// Test: an `expect-error` expectation passes end to end when its
/// module genuinely fails, and keeps the exit status clean.
#[test]
fn test_expect_error_passes_when_the_module_fails() {
    let s = Session::new();
    let builtin = s.builtin();
    s.file("broken.abc", &module_bytes("broken", &[], &["no.Such"]));
    let suite = s.file("suite.js", b"expect-error broken.abc\n");

    let code = run_with_writer(
        &cli(&[
            "-x",
            "--builtin",
            builtin.to_str().unwrap(),
            suite.to_str().unwrap(),
        ]),
        s.writer(),
    );

    assert_eq!(code, 0);
    let output = s.output();
    assert!(output.iter().any(|line| line.starts_with("Completed 1 test in")));
    assert!(!output.iter().any(|line| line.starts_with("Exception")));
}
