//! Runtime-function provider.
//!
//! The provider answers requests for primitive functions needed by generated
//! inference code. Each request is resolved, in order, against the provider's
//! [`SymbolTable`], then against functions already present in the module
//! under the same name, and only then materialized, either as an external
//! declaration or as a synthesized body.
//!
//! # Components
//!
//! - [`math`]: sqrt/abs/exp/log/sin/cos/tanh by element type
//! - [`timing`]: `clock_gettime` (declared or synthesized) and `GetTime`
//! - [`dot`]: public `DotProductFloat` / `DotProductInt`
//! - [`blas`]: GEMV/GEMM external bindings and fallback kernels

pub mod blas;
pub mod dot;
pub mod math;
pub mod timing;

pub use blas::{
    CBLAS_COL_MAJOR, CBLAS_NO_TRANS, CBLAS_ROW_MAJOR, CBLAS_TRANS, KernelBinding, KernelDescriptor, gemm_signature,
    gemv_signature,
};
pub use math::MathFunction;
pub use timing::{CLOCK_REALTIME, ClockSource, emit_current_time};

use cranelift_codegen::ir::Type;
use cranelift_module::{FuncId, Module};
use tracing::{debug, trace};

use crate::config::ProviderConfig;
use crate::emitter::ModuleEmitter;
use crate::error::Result;
use crate::symbols::{FunctionKey, SymbolTable};
use crate::types::FunctionSignature;

/// Provisions runtime functions into one module.
///
/// Borrowing the emitter ties the provider (and its cache) to the module's
/// lifetime. Several providers may be created over the same module in turn;
/// name lookup in the module keeps their results identical.
pub struct RuntimeProvider<'m, M: Module> {
    emitter: &'m mut ModuleEmitter<M>,
    symbols: SymbolTable,
    config: ProviderConfig,
    clock: ClockSource,
    current_time: Option<FuncId>,
}

impl<'m, M: Module> RuntimeProvider<'m, M> {
    pub fn new(emitter: &'m mut ModuleEmitter<M>) -> Self {
        Self::with_config(emitter, ProviderConfig::default())
    }

    pub fn with_config(emitter: &'m mut ModuleEmitter<M>, config: ProviderConfig) -> Self {
        let clock = ClockSource::for_target(emitter.target());
        debug!(module = emitter.name(), clock = ?clock, "runtime provider created");
        Self { emitter, symbols: SymbolTable::new(), config, clock, current_time: None }
    }

    /// Prefix of public symbol names: the module name.
    pub fn namespace_prefix(&self) -> &str {
        self.emitter.name()
    }

    /// Target's native signed integer (32-bit when the width is unspecified).
    pub fn native_int_type(&self) -> Type {
        self.emitter.lowering().native_int()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn emitter(&mut self) -> &mut ModuleEmitter<M> {
        &mut *self.emitter
    }

    fn namespaced(&self, operation: &str) -> FunctionKey {
        FunctionKey::namespaced(self.namespace_prefix(), operation)
    }

    /// Resolve `key`, materializing it with `materialize` on a miss.
    fn get_or_materialize<F>(&mut self, key: FunctionKey, materialize: F) -> Result<FuncId>
    where
        F: FnOnce(&mut ModuleEmitter<M>, &str) -> Result<FuncId>,
    {
        if let Some(id) = self.symbols.resolve(&key) {
            trace!(function = %key, "symbol table hit");
            return Ok(id);
        }

        if let Some(id) = self.emitter.lookup(key.name()) {
            trace!(function = %key, "module already contains function");
            self.symbols.register(key, id);
            return Ok(id);
        }

        let id = materialize(&mut *self.emitter, key.name())?;
        self.symbols.register(key, id);
        Ok(id)
    }

    /// Declare an external function under its own (global) name.
    fn declare_external(&mut self, name: &str, sig: FunctionSignature) -> Result<FuncId> {
        self.get_or_materialize(FunctionKey::global(name), |emitter, name| emitter.declare_external(name, &sig))
    }
}
