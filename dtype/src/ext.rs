use super::*;

/// Host scalar types with a fixed logical counterpart.
pub trait HasLogicalType: Copy {
    const LOGICAL_TYPE: LogicalType;
}

macro_rules! impl_logical_type_ext {
    ($($ty:ty => $logical:expr),* $(,)?) => {
        $(impl HasLogicalType for $ty { const LOGICAL_TYPE: LogicalType = $logical; })*
    };
}

impl_logical_type_ext! {
    i32 => LogicalType::Int32, i64 => LogicalType::Int64,
    f32 => LogicalType::Float32, f64 => LogicalType::Float64,
}
