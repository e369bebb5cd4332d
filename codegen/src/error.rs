//! Error types for runtime-function provisioning.

use cranelift_module::ModuleError;
use ember_dtype::LogicalType;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort code generation of the current module.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operation requested for an element type it does not support.
    #[snafu(display("{operation} does not support element type {ty}"))]
    UnsupportedType { operation: &'static str, ty: LogicalType },

    /// A required platform or external primitive could not be declared or synthesized.
    #[snafu(display("could not resolve function '{name}': {source}"))]
    FunctionResolution {
        name: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    /// Declaring or defining a function in the module failed.
    #[snafu(display("module error for '{name}': {source}"))]
    Module { name: String, source: ModuleError },

    /// A synthesized function body failed IR verification.
    #[snafu(display("generated function '{name}' is invalid: {reason}"))]
    Verifier { name: String, reason: String },

    /// A call expected to produce a value returned nothing.
    #[snafu(display("call to '{callee}' produced no value"))]
    NoReturnValue { callee: String },
}
