//! Elementary math functions by element type.
//!
//! Cranelift has native `sqrt` and `fabs` instructions but no transcendental
//! ones. Square root and absolute value resolve to module-local wrappers
//! around the instruction (`intrinsic.sqrt.f32`, ...); everything else binds
//! to the C runtime (`expf`/`exp`, ..., `tanhf`/`tanh`), which is how the
//! backend lowers library calls anyway.

use cranelift_codegen::ir::{InstBuilder, Value};
use cranelift_module::{FuncId, Linkage, Module};
use ember_dtype::LogicalType;

use super::RuntimeProvider;
use crate::emitter::FunctionEmitter;
use crate::error::{Result, UnsupportedTypeSnafu};
use crate::symbols::FunctionKey;
use crate::types::FunctionSignature;

/// Unary math function resolvable for `Float32` and `Float64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFunction {
    Sqrt,
    Abs,
    Exp,
    Log,
    Sin,
    Cos,
    Tanh,
}

impl MathFunction {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Abs => "fabs",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tanh => "tanh",
        }
    }

    /// Whether the backend has an instruction for this function.
    const fn is_instruction(self) -> bool {
        matches!(self, Self::Sqrt | Self::Abs)
    }

    /// Symbol for `ty`: C-runtime name, or wrapper name for instructions.
    fn symbol(self, ty: &LogicalType) -> Result<String> {
        let single = match ty {
            LogicalType::Float32 => true,
            LogicalType::Float64 => false,
            other => return UnsupportedTypeSnafu { operation: self.name(), ty: other.clone() }.fail(),
        };

        Ok(match (self.is_instruction(), single) {
            (true, true) => format!("intrinsic.{}.f32", self.name()),
            (true, false) => format!("intrinsic.{}.f64", self.name()),
            (false, true) => format!("{}f", self.name()),
            (false, false) => self.name().to_string(),
        })
    }

    fn emit_instruction<M: Module>(self, fe: &mut FunctionEmitter<'_, M>, arg: Value) -> Value {
        match self {
            Self::Sqrt => fe.ins().sqrt(arg),
            _ => fe.ins().fabs(arg),
        }
    }
}

impl<M: Module> RuntimeProvider<'_, M> {
    /// Function computing `function` on values of type `ty`.
    ///
    /// Fails with `UnsupportedType` unless `ty` is `Float32` or `Float64`.
    pub fn math_function(&mut self, function: MathFunction, ty: &LogicalType) -> Result<FuncId> {
        let symbol = function.symbol(ty)?;
        let sig = FunctionSignature::returning(vec![ty.clone()], ty.clone());

        if !function.is_instruction() {
            return self.declare_external(&symbol, sig);
        }

        self.get_or_materialize(FunctionKey::global(symbol), |emitter, name| {
            emitter.define_function(name, &sig, Linkage::Local, |fe| {
                let arg = fe.param(0);
                let result = function.emit_instruction(fe, arg);
                fe.ret(&[result]);
                Ok(())
            })
        })
    }

    pub fn sqrt_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Sqrt, ty)
    }

    pub fn abs_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Abs, ty)
    }

    pub fn exp_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Exp, ty)
    }

    pub fn log_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Log, ty)
    }

    pub fn sin_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Sin, ty)
    }

    pub fn cos_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Cos, ty)
    }

    /// `tanhf` for `Float32`, `tanh` for `Float64`, declared from the C runtime.
    pub fn tanh_function(&mut self, ty: &LogicalType) -> Result<FuncId> {
        self.math_function(MathFunction::Tanh, ty)
    }
}
