//! Native symbol bindings supplied by the host.

use std::collections::BTreeSet;

use crate::instance::VmInstance;

/// Symbols implemented by the host rather than by any bytecode module.
///
/// A reference to a registered native resolves without loading anything.
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    names: BTreeSet<String>,
}

impl NativeRegistry {
    /// An empty registry.
    pub fn new() -> NativeRegistry {
        NativeRegistry {
            names: BTreeSet::new(),
        }
    }

    /// Registers a native symbol. Re-registering is harmless.
    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether `name` is a registered native.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of registered natives.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Registers the shell's host services on a fresh instance.
///
/// Runs before any module executes so the builtin can reference the
/// host bindings it wraps.
pub fn link_natives(vm: &mut VmInstance) {
    for name in [
        "shell.print",
        "shell.quit",
        "shell.readBinaryFile",
        "shell.now",
    ] {
        vm.natives_mut().register(name);
    }
}
