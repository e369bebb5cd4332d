//! Logical value types.
//!
//! Every signature produced by the provisioning layer is written in terms of
//! [`LogicalType`]. The native representation (register width, pointer size)
//! is only chosen when a function is emitted for a concrete target.

use std::fmt;

pub mod ext;


pub use ext::HasLogicalType;

/// Target-independent value kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicalType {
    Int32,
    Int64,
    Float32,
    Float64,

    /// Signed integer of the target's native width.
    ///
    /// Resolved through the target descriptor at emission time
    /// (32-bit when the descriptor leaves the width unspecified).
    NativeInt,

    /// Pointer to a value of the base type.
    Ptr(Box<LogicalType>),
}

impl LogicalType {
    /// Pointer to `self`.
    pub fn ptr(self) -> Self {
        Self::Ptr(Box::new(self))
    }

    /// Size in bytes for fixed-width kinds.
    ///
    /// Returns `None` for kinds whose width depends on the target
    /// (`NativeInt` and pointers).
    pub const fn bytes(&self) -> Option<u32> {
        match self {
            Self::Int32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Float64 => Some(8),
            Self::NativeInt | Self::Ptr(_) => None,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    pub const fn is_ptr(&self) -> bool {
        matches!(self, Self::Ptr(_))
    }

    /// Pointee type for pointers, `None` otherwise.
    pub fn base(&self) -> Option<&LogicalType> {
        match self {
            Self::Ptr(base) => Some(base),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "i32"),
            Self::Int64 => write!(f, "i64"),
            Self::Float32 => write!(f, "f32"),
            Self::Float64 => write!(f, "f64"),
            Self::NativeInt => write!(f, "int"),
            Self::Ptr(base) => write!(f, "*{base}"),
        }
    }
}
