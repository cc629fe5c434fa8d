//! Native module loading.
//!
//! Two paths populate the combinator table with Rust-implemented words:
//!
//! - **statically registered** modules (`System`, `Math`, `IO` here) are
//!   compiled into this binary and installed by name through
//!   [`NativeModuleRegistry`]; `System` is always installed into the
//!   prelude before a program runs, the others on `include "math"` /
//!   `include "io"`.
//! - **dynamically loaded** extensions are a shared object a user points
//!   the interpreter at (`-L` search path, `include "myextension"`),
//!   opened with `libloading` and expected to export two C-ABI symbols,
//!   `comb_imports`/`comb_exports`, mirroring the dlopen contract real
//!   combinator libraries for this language use.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::error::RuntimeError;
use crate::machine::Machine;

/// A combinator bundle compiled into this binary.
pub trait NativeModule {
    /// Names of other native modules this one expects to already be
    /// installed (e.g. `IO` building on `System`'s Data constants).
    fn imports(&self) -> &[&str] {
        &[]
    }

    /// Register this module's combinators into `machine`.
    fn exports(&self, machine: &Machine) -> Result<(), RuntimeError>;
}

/// The statically linked native modules, looked up by the name a program
/// uses in `include "..."`.
pub struct NativeModuleRegistry {
    modules: HashMap<&'static str, Box<dyn NativeModule>>,
}

impl NativeModuleRegistry {
    pub fn standard() -> NativeModuleRegistry {
        let mut modules: HashMap<&'static str, Box<dyn NativeModule>> = HashMap::new();
        modules.insert("system", Box::new(crate::builtins::system::SystemModule));
        modules.insert("math", Box::new(crate::builtins::math::MathModule));
        modules.insert("io", Box::new(crate::builtins::io::IoModule));
        NativeModuleRegistry { modules }
    }

    pub fn install(&self, name: &str, machine: &Machine) -> Result<(), RuntimeError> {
        let module = self
            .modules
            .get(name.to_ascii_lowercase().as_str())
            .ok_or_else(|| RuntimeError::ModuleNotFound(name.to_string()))?;
        for dependency in module.imports() {
            self.install(dependency, machine)?;
        }
        module.exports(machine)
    }
}

/// Tracks `-I`/`-L` search paths and the set of modules (source or native)
/// already loaded, so `include` is idempotent the way a real module system
/// requires.
pub struct ModuleManager {
    pub include_paths: Vec<PathBuf>,
    pub library_paths: Vec<PathBuf>,
    registry: NativeModuleRegistry,
    loaded_names: RefCell<HashSet<String>>,
    // Kept alive for the process lifetime: dropping a `Library` unloads it,
    // which would dangle any combinator it registered.
    loaded_libraries: RefCell<Vec<Library>>,
}

impl ModuleManager {
    pub fn new() -> ModuleManager {
        ModuleManager {
            include_paths: Vec::new(),
            library_paths: Vec::new(),
            registry: NativeModuleRegistry::standard(),
            loaded_names: RefCell::new(HashSet::new()),
            loaded_libraries: RefCell::new(Vec::new()),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded_names.borrow().contains(name)
    }

    /// Install the always-present prelude (`System`) into a fresh machine.
    pub fn install_prelude(&self, machine: &Machine) -> Result<(), RuntimeError> {
        self.load_static("system", machine)
    }

    pub fn load_static(&self, name: &str, machine: &Machine) -> Result<(), RuntimeError> {
        let key = name.to_ascii_lowercase();
        if self.is_loaded(&key) {
            return Ok(());
        }
        self.registry.install(&key, machine)?;
        self.loaded_names.borrow_mut().insert(key);
        Ok(())
    }

    /// Resolve `name` against the configured search paths, preferring a
    /// statically linked module of the same name, then a source file
    /// (`.comb`), then a shared object the caller will hand to
    /// [`ModuleManager::load_native_extension`].
    pub fn resolve_source(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.include_paths {
            let candidate = dir.join(name).with_extension("comb");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    pub fn resolve_library(&self, name: &str) -> Option<PathBuf> {
        let file_name = format!("lib{name}.{}", std::env::consts::DLL_EXTENSION);
        for dir in &self.library_paths {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    pub fn load_native_extension(&self, path: &Path, machine: &Machine) -> Result<(), RuntimeError> {
        let key = path.display().to_string();
        if self.is_loaded(&key) {
            return Ok(());
        }
        let load_err = |reason: String| RuntimeError::NativeLoadFailed {
            path: key.clone(),
            reason,
        };

        // SAFETY: loading arbitrary native code is inherently unsafe; the
        // caller chose `path` via an explicit `-L`/`include` search, the
        // same trust boundary a dlopen-based extension mechanism always has.
        let library = unsafe { Library::new(path) }.map_err(|e| load_err(e.to_string()))?;

        type ImportsFn = unsafe extern "C" fn() -> *const c_char;
        type ExportsFn = unsafe extern "C" fn(*const Machine);

        unsafe {
            if let Ok(imports) = library.get::<ImportsFn>(b"comb_imports\0") {
                let raw = imports();
                if !raw.is_null() {
                    let list = CStr::from_ptr(raw).to_string_lossy();
                    for dependency in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                        self.load_dependency(dependency, machine)?;
                    }
                }
            }
            let exports: Symbol<ExportsFn> =
                library.get(b"comb_exports\0").map_err(|e| load_err(e.to_string()))?;
            exports(machine as *const Machine);
        }

        self.loaded_names.borrow_mut().insert(key);
        self.loaded_libraries.borrow_mut().push(library);
        Ok(())
    }

    fn load_dependency(&self, name: &str, machine: &Machine) -> Result<(), RuntimeError> {
        if self.load_static(name, machine).is_ok() {
            return Ok(());
        }
        match self.resolve_library(name) {
            Some(path) => self.load_native_extension(&path, machine),
            None => Err(RuntimeError::ModuleNotFound(name.to_string())),
        }
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        ModuleManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_installs_system_once() {
        let machine = Machine::new();
        let manager = ModuleManager::new();
        manager.install_prelude(&machine).unwrap();
        assert!(manager.is_loaded("system"));
        manager.install_prelude(&machine).unwrap();
        let nil = machine.lookup_symbol("System", "nil");
        assert!(nil.is_some());
    }

    #[test]
    fn unknown_static_module_is_an_error() {
        let machine = Machine::new();
        let manager = ModuleManager::new();
        let err = manager.load_static("not_a_real_module", &machine).unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleNotFound(_)));
    }
}
