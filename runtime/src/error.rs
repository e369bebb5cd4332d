//! Failures of the JIT host.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Provisioning a runtime function failed.
    #[snafu(display("provisioning failed: {source}"))]
    Codegen { source: ember_codegen::Error },

    /// ISA setup or finalization of the module failed.
    #[snafu(display("JIT compilation failed: {reason}"))]
    JitCompilation { reason: String },

    /// No function under this name, or only an import with no code in the module.
    #[snafu(display("no code for function '{name}': not declared, or imported rather than defined"))]
    FunctionNotFound { name: String },
}

impl From<ember_codegen::Error> for Error {
    fn from(source: ember_codegen::Error) -> Self {
        Self::Codegen { source }
    }
}
