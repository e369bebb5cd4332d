//! Module-level emission over a Cranelift [`Module`].
//!
//! [`ModuleEmitter`] is the function-builder capability the provider drives:
//! it declares external symbols, opens a function with a typed signature,
//! hands a [`FunctionEmitter`] to the body closure and closes the function.
//! Function construction never nests: one body is driven to completion before
//! the next function is opened.

mod function;

pub use function::FunctionEmitter;

use cranelift_codegen::ir::{AbiParam, Function, Signature, UserFuncName};
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{FuncId, FuncOrDataId, Linkage, Module};
use ember_device::{TargetDescriptor, TimespecLayout};
use snafu::ResultExt;
use tracing::debug;

use crate::error::{ModuleSnafu, Result, VerifierSnafu};
use crate::types::{FunctionSignature, TypeLowering};

/// Owns one compilation unit and the target it is emitted for.
pub struct ModuleEmitter<M: Module> {
    module: M,
    name: String,
    target: TargetDescriptor,
    lowering: TypeLowering,
    timespec: TimespecLayout,
}

impl<M: Module> ModuleEmitter<M> {
    /// Wrap `module`. `name` becomes the namespace prefix of public symbols.
    pub fn new(module: M, name: impl Into<String>, target: TargetDescriptor) -> Self {
        let pointer = module.target_config().pointer_type();
        let lowering = TypeLowering::new(&target, pointer);
        let timespec = TimespecLayout::for_pointer_bits(pointer.bits());
        Self { module, name: name.into(), target, lowering, timespec }
    }

    /// Override the layout of the time structure used by the timing functions.
    pub fn with_timespec_layout(mut self, layout: TimespecLayout) -> Self {
        self.timespec = layout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn lowering(&self) -> TypeLowering {
        self.lowering
    }

    pub fn timespec_layout(&self) -> &TimespecLayout {
        &self.timespec
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn into_module(self) -> M {
        self.module
    }

    /// Function already declared under `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<FuncId> {
        match self.module.get_name(name) {
            Some(FuncOrDataId::Func(id)) => Some(id),
            _ => None,
        }
    }

    /// Lower a logical signature using the module's calling convention.
    pub fn signature(&self, sig: &FunctionSignature) -> Signature {
        let mut signature = self.module.make_signature();
        signature.params.extend(sig.params.iter().map(|ty| AbiParam::new(self.lowering.lower(ty))));
        if let Some(ret) = &sig.returns {
            signature.returns.push(AbiParam::new(self.lowering.lower(ret)));
        }
        signature
    }

    /// Declare a function defined outside the module. Idempotent per name.
    pub fn declare_external(&mut self, name: &str, sig: &FunctionSignature) -> Result<FuncId> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let signature = self.signature(sig);
        let id = self.module.declare_function(name, Linkage::Import, &signature).context(ModuleSnafu { name })?;
        debug!(function = name, linkage = "import", "declared external function");
        Ok(id)
    }

    /// Open a function, emit its body and close it.
    ///
    /// The body must terminate every block it creates (normally with
    /// [`FunctionEmitter::ret`]). If the body or the verifier fails, `name`
    /// stays undeclared.
    pub fn define_function<F>(&mut self, name: &str, sig: &FunctionSignature, linkage: Linkage, body: F) -> Result<FuncId>
    where
        F: FnOnce(&mut FunctionEmitter<'_, M>) -> Result<()>,
    {
        let signature = self.signature(sig);

        // Nothing is declared under `name` until the body has been built and verified.
        let mut func = Function::with_name_signature(UserFuncName::user(0, 0), signature.clone());
        let mut func_ctx = FunctionBuilderContext::new();
        {
            let builder = FunctionBuilder::new(&mut func, &mut func_ctx);
            let mut emitter = FunctionEmitter::new(builder, &mut self.module, self.lowering);
            body(&mut emitter)?;
            emitter.finalize();
        }

        cranelift_codegen::verify_function(&func, self.module.isa())
            .map_err(|errors| errors.to_string())
            .map_err(|reason| VerifierSnafu { name, reason }.build())?;

        let id = self.module.declare_function(name, linkage, &signature).context(ModuleSnafu { name })?;
        func.name = UserFuncName::user(0, id.as_u32());

        let mut ctx = self.module.make_context();
        ctx.func = func;
        self.module.define_function(id, &mut ctx).context(ModuleSnafu { name })?;
        self.module.clear_context(&mut ctx);

        debug!(function = name, linkage = ?linkage, "defined function");
        Ok(id)
    }
}
