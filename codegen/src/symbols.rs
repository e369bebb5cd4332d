//! Per-module symbol table enforcing "declare or emit at most once".

use std::collections::HashMap;
use std::fmt;

use cranelift_module::FuncId;

/// Handle to a function declared or defined in the current module.
pub type FunctionHandle = FuncId;

/// Identity under which idempotency is enforced.
///
/// The key is the symbol name itself: either a fixed symbol (`noblas_sgemv`,
/// `cblas_dgemm`, `tanhf`) or a name namespaced by the module
/// (`<module>_DotProductFloat`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionKey(String);

impl FunctionKey {
    /// Fixed symbol name, shared by every module.
    pub fn global(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `<prefix>_<operation>`.
    pub fn namespaced(prefix: &str, operation: &str) -> Self {
        Self(format!("{prefix}_{operation}"))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from function key to its materialized handle.
///
/// Owned by a provider; never outlives the module it indexes.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<FunctionKey, FunctionHandle>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, key: &FunctionKey) -> Option<FunctionHandle> {
        self.entries.get(key).copied()
    }

    /// Record a freshly materialized function.
    ///
    /// Each key is registered at most once; callers check [`resolve`](Self::resolve) first.
    pub fn register(&mut self, key: FunctionKey, handle: FunctionHandle) {
        let previous = self.entries.insert(key, handle);
        debug_assert!(previous.is_none_or(|p| p == handle), "function key registered twice with different handles");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
