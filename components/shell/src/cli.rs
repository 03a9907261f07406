//! Command-line surface of the `vermeil` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::bootstrap::{
    BootstrapOptions, GlobalLibraryPaths, DEFAULT_AUX_LIBRARY_PATH, DEFAULT_BUILTIN_PATH,
    DEFAULT_LIBRARY_CATALOG_PATH, DEFAULT_LIBRARY_CHUNKS_PATH,
};

/// Command-line arguments for the Vermeil shell.
///
/// Switches select one or more actions over the input files; the
/// modifiers tune how execution behaves. Files with unrecognized
/// suffixes are accepted and ignored.
#[derive(Parser, Debug)]
#[command(name = "vermeil", version, about = "Command-line shell for the Vermeil player")]
pub struct Cli {
    /// Parse file(s)
    #[arg(short = 'p', long)]
    pub parse: bool,

    /// Disassemble file(s)
    #[arg(short = 'd', long)]
    pub disassemble: bool,

    /// Compile file(s)
    #[arg(short = 'c', long)]
    pub compile: bool,

    /// Execute file(s)
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Interpreter only, no ahead-of-run translation
    #[arg(short = 'i', long)]
    pub interpreter: bool,

    /// Keep output free of debug messages
    #[arg(long)]
    pub porcelain: bool,

    /// Load the global library catalog
    #[arg(short = 'g', long = "global-library")]
    pub global_library: bool,

    /// Load the auxiliary shell library
    #[arg(short = 's', long = "aux-library")]
    pub aux_library: bool,

    /// Micro-task duration budget in virtual milliseconds, 0 = unbounded
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub duration: u64,

    /// Micro-task count budget, 0 = unbounded
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub count: u64,

    /// Location of the builtin module
    #[arg(long, value_name = "PATH", default_value = DEFAULT_BUILTIN_PATH)]
    pub builtin: PathBuf,

    /// Location of the auxiliary library module
    #[arg(long = "aux-lib", value_name = "PATH", default_value = DEFAULT_AUX_LIBRARY_PATH)]
    pub aux_lib: PathBuf,

    /// Location of the global library chunk blob
    #[arg(long = "library-chunks", value_name = "PATH", default_value = DEFAULT_LIBRARY_CHUNKS_PATH)]
    pub library_chunks: PathBuf,

    /// Location of the global library catalog JSON
    #[arg(long = "library-catalog", value_name = "PATH", default_value = DEFAULT_LIBRARY_CATALOG_PATH)]
    pub library_catalog: PathBuf,

    /// Input files: .abc, .swf, .js, or anything (ignored)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Bootstrap options derived from the flags.
    ///
    /// `load_global_library` is decided by the caller, since the `-g`
    /// flag is not the only trigger: queuing any container input loads
    /// the catalog too.
    pub fn bootstrap_options(&self, load_global_library: bool) -> BootstrapOptions {
        BootstrapOptions {
            builtin_path: self.builtin.clone(),
            aux_library_path: self.aux_library.then(|| self.aux_lib.clone()),
            global_library: load_global_library.then(|| GlobalLibraryPaths {
                chunks: self.library_chunks.clone(),
                catalog: self.library_catalog.clone(),
            }),
            interpreter_only: self.interpreter,
        }
    }
}
