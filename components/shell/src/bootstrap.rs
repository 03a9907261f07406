//! Virtual-machine bootstrap sequencing.
//!
//! The order is fixed: builtin module first, then the global library
//! catalog, then the auxiliary library, because each stage may depend on
//! symbols the previous one brought in. A failure at any stage is
//! returned to `main`, which treats it as fatal; there is no degraded
//! mode without the builtin.

use std::path::{Path, PathBuf};

use bytecode::BytecodeModule;
use vm::{link_natives, ExecutionMode, LibraryCatalog, Namespace, VmInstance};

use crate::error::{ShellError, ShellResult};
use crate::writer::ShellWriter;

/// Default location of the builtin module.
pub const DEFAULT_BUILTIN_PATH: &str = "build/libs/builtin.abc";
/// Default location of the auxiliary shell library.
pub const DEFAULT_AUX_LIBRARY_PATH: &str = "build/libs/shell.abc";
/// Default location of the global library chunk blob.
pub const DEFAULT_LIBRARY_CHUNKS_PATH: &str = "build/library/global.abcs";
/// Default location of the global library catalog JSON.
pub const DEFAULT_LIBRARY_CATALOG_PATH: &str = "build/library/global.json";

/// The two co-located files of the global library.
#[derive(Debug, Clone)]
pub struct GlobalLibraryPaths {
    /// Binary blob of concatenated bytecode chunks.
    pub chunks: PathBuf,
    /// JSON catalog indexing the blob.
    pub catalog: PathBuf,
}

/// Everything `bootstrap` needs to build an instance.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Location of the builtin module. The VM is unusable without it.
    pub builtin_path: PathBuf,
    /// Auxiliary library to execute after the catalog, if any.
    pub aux_library_path: Option<PathBuf>,
    /// Global library to index for lazy loading, if any.
    pub global_library: Option<GlobalLibraryPaths>,
    /// Skip ahead-of-run verification and interpret directly.
    pub interpreter_only: bool,
}

impl Default for BootstrapOptions {
    fn default() -> BootstrapOptions {
        BootstrapOptions {
            builtin_path: PathBuf::from(DEFAULT_BUILTIN_PATH),
            aux_library_path: None,
            global_library: None,
            interpreter_only: false,
        }
    }
}

/// Builds a virtual machine per the fixed bootstrap sequence.
///
/// Reads the builtin bytes, picks the execution mode for both
/// namespaces, links the host natives, executes the builtin in the
/// system namespace, then optionally installs the global library
/// catalog and executes the auxiliary library, in that order. Duplicate
/// catalog definitions keep the last row and are warned about, one line
/// per symbol.
pub fn bootstrap(options: &BootstrapOptions, writer: &ShellWriter) -> ShellResult<VmInstance> {
    let builtin_bytes = read_binary(&options.builtin_path)?;
    let mode = if options.interpreter_only {
        ExecutionMode::Interpret
    } else {
        ExecutionMode::Compile
    };
    let mut vm = VmInstance::new(mode, mode);
    link_natives(&mut vm);

    let builtin = BytecodeModule::parse(&builtin_bytes, &module_name(&options.builtin_path))?;
    vm.execute_in(Namespace::System, &builtin)?;

    if let Some(paths) = &options.global_library {
        let blob = read_binary(&paths.chunks)?;
        let json = std::fs::read_to_string(&paths.catalog)
            .map_err(|error| ShellError::io(&paths.catalog, error))?;
        let catalog = LibraryCatalog::from_json(&json, blob)?;
        for symbol in catalog.duplicate_definitions() {
            writer.warn_line(&format!(
                "catalog defines '{}' more than once; the last row wins",
                symbol
            ));
        }
        writer.debug_line(&format!(
            "Loaded library catalog: {} script(s), {} symbol(s)",
            catalog.script_count(),
            catalog.symbol_count()
        ));
        vm.install_catalog(catalog);
    }

    if let Some(path) = &options.aux_library_path {
        let bytes = read_binary(path)?;
        let module = BytecodeModule::parse(&bytes, &module_name(path))?;
        vm.execute_in(Namespace::System, &module)?;
    }

    Ok(vm)
}

fn read_binary(path: &Path) -> ShellResult<Vec<u8>> {
    std::fs::read(path).map_err(|error| ShellError::io(path, error))
}

/// Origin tag for a library module: its file name, not the full path.
fn module_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
