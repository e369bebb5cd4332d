//! Lowering of logical types to Cranelift types.

use cranelift_codegen::ir::{Type, types};
use ember_device::{NativeIntWidth, TargetDescriptor};
use ember_dtype::LogicalType;

/// Resolves logical types for one target.
///
/// Built once per module from the target descriptor and the module's pointer
/// type; pure and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeLowering {
    pointer: Type,
    native_int: Type,
}

impl TypeLowering {
    pub fn new(target: &TargetDescriptor, pointer: Type) -> Self {
        Self { pointer, native_int: native_int_type(target.int_width()) }
    }

    /// Cranelift type for a logical type.
    pub fn lower(&self, ty: &LogicalType) -> Type {
        match ty {
            LogicalType::Int32 => types::I32,
            LogicalType::Int64 => types::I64,
            LogicalType::Float32 => types::F32,
            LogicalType::Float64 => types::F64,
            LogicalType::NativeInt => self.native_int,
            LogicalType::Ptr(_) => self.pointer,
        }
    }

    /// Target's native signed integer.
    pub fn native_int(&self) -> Type {
        self.native_int
    }

    pub fn pointer(&self) -> Type {
        self.pointer
    }

    /// Size in bytes of a value of `ty` on this target.
    pub fn bytes(&self, ty: &LogicalType) -> u32 {
        self.lower(ty).bytes()
    }
}

/// Native integer for a width, 32 bits when unspecified.
pub fn native_int_type(width: NativeIntWidth) -> Type {
    match width {
        NativeIntWidth::Bits8 => types::I8,
        NativeIntWidth::Bits16 => types::I16,
        NativeIntWidth::Bits64 => types::I64,
        NativeIntWidth::Bits32 | NativeIntWidth::Unspecified => types::I32,
    }
}

/// Parameter and return types of a function, in logical terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub params: Vec<LogicalType>,
    pub returns: Option<LogicalType>,
}

impl FunctionSignature {
    pub fn new(params: Vec<LogicalType>, returns: Option<LogicalType>) -> Self {
        Self { params, returns }
    }

    /// Function returning nothing.
    pub fn void(params: Vec<LogicalType>) -> Self {
        Self::new(params, None)
    }

    /// Function returning a value of `ret`.
    pub fn returning(params: Vec<LogicalType>, ret: LogicalType) -> Self {
        Self::new(params, Some(ret))
    }
}
