//! The VM instance and its two execution namespaces.

use std::collections::{HashMap, HashSet};

use bytecode::BytecodeModule;
use core_types::VmError;

use crate::catalog::LibraryCatalog;
use crate::natives::NativeRegistry;

/// How a namespace treats modules before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Execute directly, skipping structural verification.
    Interpret,
    /// Verify each module before it links.
    Compile,
}

/// The two namespaces hosted by a [`VmInstance`].
///
/// Application lookups fall back to the system namespace; system lookups
/// never see application definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Builtin, auxiliary library, and lazily loaded catalog chunks.
    System,
    /// User modules from the command line and from containers.
    Application,
}

#[derive(Debug, Default)]
struct Domain {
    defined: HashMap<String, String>,
    executed: Vec<String>,
}

/// One virtual machine: two namespaces, a native registry, and an
/// optional global library catalog for lazy symbol resolution.
#[derive(Debug)]
pub struct VmInstance {
    system_mode: ExecutionMode,
    application_mode: ExecutionMode,
    system: Domain,
    application: Domain,
    natives: NativeRegistry,
    catalog: Option<LibraryCatalog>,
    loaded_scripts: HashSet<String>,
    loading_chunks: Vec<String>,
}

impl VmInstance {
    /// Creates an instance with per-namespace execution modes.
    pub fn new(system_mode: ExecutionMode, application_mode: ExecutionMode) -> VmInstance {
        VmInstance {
            system_mode,
            application_mode,
            system: Domain::default(),
            application: Domain::default(),
            natives: NativeRegistry::new(),
            catalog: None,
            loaded_scripts: HashSet::new(),
            loading_chunks: Vec::new(),
        }
    }

    /// The execution mode of `namespace`.
    pub fn mode(&self, namespace: Namespace) -> ExecutionMode {
        match namespace {
            Namespace::System => self.system_mode,
            Namespace::Application => self.application_mode,
        }
    }

    /// Installs the global library catalog used for lazy loading.
    pub fn install_catalog(&mut self, catalog: LibraryCatalog) {
        self.catalog = Some(catalog);
    }

    /// The installed catalog, if any.
    pub fn catalog(&self) -> Option<&LibraryCatalog> {
        self.catalog.as_ref()
    }

    /// The host-native symbol registry.
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Mutable access for registering natives.
    pub fn natives_mut(&mut self) -> &mut NativeRegistry {
        &mut self.natives
    }

    /// The module that defined `symbol` directly in `namespace`, without
    /// the application-to-system fallback.
    pub fn definition_of(&self, namespace: Namespace, symbol: &str) -> Option<&str> {
        self.domain(namespace)
            .defined
            .get(symbol)
            .map(String::as_str)
    }

    /// Names of modules executed in `namespace`, in execution order.
    pub fn executed_modules(&self, namespace: Namespace) -> &[String] {
        &self.domain(namespace).executed
    }

    /// Verifies, links, and executes `module` in `namespace`.
    ///
    /// References resolve through the module's own definitions, the
    /// target namespace chain, the native registry, and finally the
    /// catalog, which loads the defining chunk into the system namespace
    /// on the spot. An unresolvable reference is a link error naming the
    /// symbol and the requesting module; a definition already claimed by
    /// a different module is an execution error.
    pub fn execute_in(
        &mut self,
        namespace: Namespace,
        module: &BytecodeModule,
    ) -> Result<(), VmError> {
        if self.mode(namespace) == ExecutionMode::Compile {
            module.verify().map_err(|error| {
                VmError::verify(error.to_string()).with_frame(module.name().to_string())
            })?;
        }
        for reference in module.refs() {
            if module.defs().iter().any(|def| def == reference) {
                continue;
            }
            if self.lookup(namespace, reference) {
                continue;
            }
            if self.natives.contains(reference) {
                continue;
            }
            if self.try_load_from_catalog(reference)? {
                if self.lookup(namespace, reference) {
                    continue;
                }
                let script = self
                    .catalog
                    .as_ref()
                    .and_then(|catalog| catalog.script_for_symbol(reference))
                    .unwrap_or("?");
                return Err(VmError::link(format!(
                    "catalog chunk '{}' did not define symbol '{}'",
                    script, reference
                ))
                .with_frame(module.name().to_string()));
            }
            return Err(VmError::link(format!(
                "unresolved symbol '{}' referenced by module '{}'",
                reference,
                module.name()
            ))
            .with_frame(module.name().to_string()));
        }
        self.record(namespace, module)
    }

    fn domain(&self, namespace: Namespace) -> &Domain {
        match namespace {
            Namespace::System => &self.system,
            Namespace::Application => &self.application,
        }
    }

    fn domain_mut(&mut self, namespace: Namespace) -> &mut Domain {
        match namespace {
            Namespace::System => &mut self.system,
            Namespace::Application => &mut self.application,
        }
    }

    /// Resolves `symbol` through the namespace chain.
    fn lookup(&self, namespace: Namespace, symbol: &str) -> bool {
        match namespace {
            Namespace::System => self.system.defined.contains_key(symbol),
            Namespace::Application => {
                self.application.defined.contains_key(symbol)
                    || self.system.defined.contains_key(symbol)
            }
        }
    }

    /// Loads the chunk defining `symbol` into the system namespace.
    ///
    /// Returns `Ok(false)` when no catalog row covers the symbol,
    /// `Ok(true)` once the defining script has executed (now or on an
    /// earlier call). The in-flight chunk stack detects dependency
    /// cycles and names each chunk in the error stack as the recursion
    /// unwinds.
    fn try_load_from_catalog(&mut self, symbol: &str) -> Result<bool, VmError> {
        let Some(catalog) = self.catalog.as_ref() else {
            return Ok(false);
        };
        let Some(script) = catalog.script_for_symbol(symbol) else {
            return Ok(false);
        };
        if self.loaded_scripts.contains(script) {
            return Ok(true);
        }
        if self.loading_chunks.iter().any(|name| name == script) {
            // Frames accumulate as the recursion unwinds.
            return Err(VmError::link(format!(
                "cyclic dependency while loading chunk '{}'",
                script
            )));
        }
        let bytes = catalog
            .chunk_bytes(script)
            .map_err(|error| VmError::load(error.to_string()))?
            .to_vec();
        let script = script.to_string();
        self.loading_chunks.push(script.clone());
        let outcome = BytecodeModule::parse(&bytes, &script)
            .map_err(|error| VmError::load(error.to_string()))
            .and_then(|module| self.execute_in(Namespace::System, &module));
        self.loading_chunks.pop();
        match outcome {
            Ok(()) => {
                self.loaded_scripts.insert(script);
                Ok(true)
            }
            Err(error) => Err(error.with_frame(format!("chunk {}", script))),
        }
    }

    /// Claims the module's definitions and logs the execution.
    fn record(&mut self, namespace: Namespace, module: &BytecodeModule) -> Result<(), VmError> {
        let name = module.name().to_string();
        let domain = self.domain_mut(namespace);
        for def in module.defs() {
            match domain.defined.get(def) {
                Some(existing) if existing != &name => {
                    return Err(VmError::execution(format!(
                        "symbol '{}' already defined by module '{}'",
                        def, existing
                    ))
                    .with_frame(name));
                }
                _ => {
                    domain.defined.insert(def.clone(), name.clone());
                }
            }
        }
        domain.executed.push(name);
        Ok(())
    }
}
