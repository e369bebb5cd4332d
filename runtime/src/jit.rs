//! Cranelift JIT compilation of provisioned modules.

use std::sync::Arc;

use cranelift_codegen::isa::TargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Module, default_libcall_names};
use ember_codegen::{ModuleEmitter, ProviderConfig, RuntimeProvider};
use ember_device::TargetDescriptor;
use tracing::debug;

use crate::host::HostSymbols;
use crate::{Error, Result};

/// Native ISA of the running machine, configured for JIT use.
pub fn host_isa() -> Result<Arc<dyn TargetIsa>> {
    let mut flag_builder = settings::builder();
    flag_builder
        .set("use_colocated_libcalls", "false")
        .map_err(|e| Error::JitCompilation { reason: format!("Failed to set cranelift flag: {e}") })?;
    flag_builder
        .set("is_pic", "false")
        .map_err(|e| Error::JitCompilation { reason: format!("Failed to set cranelift flag: {e}") })?;

    cranelift_native::builder()
        .map_err(|e| Error::JitCompilation { reason: format!("Failed to create native ISA builder: {e}") })?
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| Error::JitCompilation { reason: format!("Failed to finish ISA: {e}") })
}

/// A module under construction, backed by the host JIT.
pub struct JitSession {
    emitter: ModuleEmitter<JITModule>,
}

impl JitSession {
    /// Open a JIT module named `name` for `target`, resolving `host` symbols first.
    ///
    /// `target` only changes which functions are provisioned; the code itself
    /// always runs on the host.
    pub fn new(name: &str, target: TargetDescriptor, host: &HostSymbols) -> Result<Self> {
        let mut builder = JITBuilder::with_isa(host_isa()?, default_libcall_names());
        host.register(&mut builder);

        debug!(module = name, os = ?target.os(), host_symbols = host.len(), "JIT session opened");
        Ok(Self { emitter: ModuleEmitter::new(JITModule::new(builder), name, target) })
    }

    pub fn emitter(&mut self) -> &mut ModuleEmitter<JITModule> {
        &mut self.emitter
    }

    /// Provider over this session's module with the default configuration.
    pub fn provider(&mut self) -> RuntimeProvider<'_, JITModule> {
        RuntimeProvider::new(&mut self.emitter)
    }

    pub fn provider_with_config(&mut self, config: ProviderConfig) -> RuntimeProvider<'_, JITModule> {
        RuntimeProvider::with_config(&mut self.emitter, config)
    }

    /// Resolve imports and make every defined function executable.
    pub fn finalize(self) -> Result<CompiledModule> {
        let name = self.emitter.name().to_string();
        let mut module = self.emitter.into_module();
        module
            .finalize_definitions()
            .map_err(|e| Error::JitCompilation { reason: format!("Failed to finalize: {e}") })?;

        debug!(module = %name, "JIT module finalized");
        Ok(CompiledModule { module, name })
    }
}

/// Finalized machine code for one module.
///
/// Function pointers obtained from it are valid while it is alive.
pub struct CompiledModule {
    module: JITModule,
    name: String,
}

impl CompiledModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function declared under `name`.
    pub fn lookup(&self, name: &str) -> Result<FuncId> {
        match self.module.get_name(name) {
            Some(cranelift_module::FuncOrDataId::Func(id)) => Ok(id),
            _ => Err(Error::FunctionNotFound { name: name.to_string() }),
        }
    }

    /// Address of a function defined in this module.
    ///
    /// Imports have no code here and fail with `FunctionNotFound`.
    pub fn function_ptr(&self, id: FuncId) -> Result<*const u8> {
        let decl = self.module.declarations().get_function_decl(id);
        if !decl.linkage.is_definable() {
            return Err(Error::FunctionNotFound { name: decl.linkage_name(id).into_owned() });
        }
        Ok(self.module.get_finalized_function(id))
    }

    /// Typed pointer to a defined function.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern "C"` function pointer type matching the
    /// function's signature. The pointer must not outlive `self`.
    pub unsafe fn function<F: Copy>(&self, id: FuncId) -> Result<F> {
        debug_assert_eq!(size_of::<F>(), size_of::<*const u8>(), "F must be a function pointer");
        let ptr = self.function_ptr(id)?;
        // SAFETY: caller guarantees F is a function pointer of the right signature.
        Ok(unsafe { std::mem::transmute_copy::<*const u8, F>(&ptr) })
    }
}
