//! Runtime-function provisioning for generated inference code.
//!
//! Given a request for a primitive operation (a math function, a
//! high-resolution timer, a dot product or a dense linear-algebra kernel), the
//! [`RuntimeProvider`] either declares an externally linked implementation or
//! synthesizes one as Cranelift IR, and guarantees each distinct primitive is
//! materialized at most once per module.
//!
//! # Architecture
//!
//! - **Emitter**: function-builder capability over any `cranelift_module::Module`
//! - **Symbols**: per-provider idempotency cache
//! - **Provider**: math, timing, dot product and BLAS components
//!
//! # Usage
//!
//! ```ignore
//! let mut emitter = ModuleEmitter::new(module, "model", TargetDescriptor::host());
//! let mut provider = RuntimeProvider::new(&mut emitter);
//! let gemm = provider.sgemm_function(KernelBinding::Native)?;
//! let now = provider.current_time_function()?;
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod provider;
pub mod symbols;
pub mod types;


pub use config::ProviderConfig;
pub use emitter::{FunctionEmitter, ModuleEmitter};
pub use error::*;
pub use provider::*;
pub use symbols::{FunctionHandle, FunctionKey, SymbolTable};
pub use types::{FunctionSignature, TypeLowering, native_int_type};
