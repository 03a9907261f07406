//! Top-level run sequencing for the CLI.
//!
//! Mirrors the shell's one-shot lifecycle: compile and parse modes run
//! without a virtual machine, execute mode bootstraps one and then
//! dispatches each file in order, disassemble mode renders listings.
//! The exit status reflects unit-test failures only; per-file execution
//! failures are reported but do not change it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use bytecode::BytecodeModule;
use container::ContainerFile;

use crate::cli::Cli;
use crate::dispatch::{requires_global_library, FileKind};
use crate::error::{ShellError, ShellResult};
use crate::extractor::extract_bytecode;
use crate::shell::Shell;
use crate::writer::ShellWriter;

/// Runs the CLI to completion and returns the process exit code.
pub fn run(cli: &Cli) -> i32 {
    let writer = ShellWriter::new(cli.verbose, cli.porcelain);
    run_with_writer(cli, writer)
}

/// Like [`run`], but over a caller-supplied writer so tests can capture
/// the output.
pub fn run_with_writer(cli: &Cli, writer: ShellWriter) -> i32 {
    let mut shell = Shell::new(writer.clone());
    shell.set_budgets(cli.duration, cli.count);

    if cli.compile {
        compile_files(&cli.files, &writer);
    }

    if cli.parse {
        parse_files(&cli.files, &writer);
    }

    if cli.execute {
        let load_global_library = cli.global_library || requires_global_library(&cli.files);
        let options = cli.bootstrap_options(load_global_library);
        match shell.bootstrap(&options) {
            Ok(()) => {
                for file in &cli.files {
                    shell.execute_file(file);
                }
            }
            Err(error) => {
                // No degraded mode without the builtin library.
                writer.error_line(&format!("Bootstrap failed: {}", error));
                writer.error_lines(error.stack());
                return 1;
            }
        }
    } else if cli.disassemble {
        disassemble_files(&cli.files, &writer);
    }

    if shell.ever_failed() {
        writer.error_line("Some unit tests failed");
        return 1;
    }
    0
}

/// Collects every module named on the command line, directly from
/// `.abc` files and via extraction from `.swf` files, then verifies
/// them as the ahead-of-run translator would: the first module is the
/// primary unit, the rest are companions it may link against.
fn compile_files(files: &[PathBuf], writer: &ShellWriter) {
    let mut modules = Vec::new();
    for file in files {
        match FileKind::classify(file) {
            FileKind::RawBytecode => match read_module(file) {
                Ok(module) => modules.push(module),
                Err(error) => writer.error_line(&format!("{}: {}", file.display(), error)),
            },
            FileKind::PackagedContainer => match std::fs::read(file) {
                Ok(bytes) => {
                    if let Some(extracted) = extract_bytecode(&bytes, writer) {
                        modules.extend(extracted);
                    }
                }
                Err(error) => {
                    writer.error_line(&format!("failed to read '{}': {}", file.display(), error))
                }
            },
            _ => {}
        }
    }
    let Some((primary, companions)) = modules.split_first() else {
        return;
    };
    writer.debug_line(&format!(
        "Compiling {} with {} companion(s)",
        primary.name(),
        companions.len()
    ));
    for module in &modules {
        match module.verify() {
            Ok(()) => writer.debug_line(&format!("Compiled: {}", module.name())),
            Err(error) => {
                writer.error_line(&format!("Cannot compile {}: {}", module.name(), error))
            }
        }
    }
}

/// Probe-parses each file, with per-file timing under verbose output.
fn parse_files(files: &[PathBuf], writer: &ShellWriter) {
    let started = Instant::now();
    for file in files {
        writer.debug_line(&format!("Parsing: {}", file.display()));
        if let Err(error) = probe_parse(file) {
            writer.error_line(&format!(
                "Cannot parse: {}, reason: {}",
                file.display(),
                error
            ));
        }
    }
    writer.debug_line(&format!(
        "Total Parse Time: {:.2} ms.",
        started.elapsed().as_secs_f64() * 1000.0
    ));
}

/// Parses a file without executing anything. Scripts and unrecognized
/// files are not parse targets.
fn probe_parse(file: &Path) -> ShellResult<()> {
    match FileKind::classify(file) {
        FileKind::RawBytecode => {
            read_module(file)?;
        }
        FileKind::PackagedContainer => {
            let bytes = std::fs::read(file).map_err(|error| ShellError::io(file, error))?;
            ContainerFile::parse(&bytes)?;
        }
        FileKind::ScriptTest | FileKind::Unrecognized => {}
    }
    Ok(())
}

fn disassemble_files(files: &[PathBuf], writer: &ShellWriter) {
    for file in files {
        if FileKind::classify(file) != FileKind::RawBytecode {
            continue;
        }
        match read_module(file) {
            Ok(module) => writer.write_line(&module.disassemble()),
            Err(error) => writer.error_line(&format!("{}: {}", file.display(), error)),
        }
    }
}

fn read_module(file: &Path) -> ShellResult<BytecodeModule> {
    let bytes = std::fs::read(file).map_err(|error| ShellError::io(file, error))?;
    Ok(BytecodeModule::parse(&bytes, &file.display().to_string())?)
}
