//! JIT host for runtime functions provisioned by `ember-codegen`.
//!
//! A [`JitSession`] wraps a Cranelift JIT module for the host ISA. Functions
//! are provisioned into it through a [`RuntimeProvider`](ember_codegen::RuntimeProvider),
//! the session is finalized into a [`CompiledModule`], and the resulting
//! machine code is called through the typed pointers in [`abi`].
//!
//! External symbols (C runtime, BLAS, Win32) are resolved through
//! [`HostSymbols`] first and the process's dynamic symbol table second.

pub mod abi;
pub mod error;
pub mod host;
pub mod jit;

#[cfg(test)]
pub mod test;

pub use error::*;
pub use host::HostSymbols;
pub use jit::{CompiledModule, JitSession, host_isa};
