//! Layout of the two-field time structure filled by `clock_gettime`.

use ember_dtype::LogicalType;

/// Field layout of `struct timespec { tv_sec; tv_nsec; }`.
///
/// Both fields share one integer type. Offsets are in bytes from the start
/// of the structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimespecLayout {
    field: LogicalType,
    seconds_offset: i32,
    nanos_offset: i32,
    size: u32,
    align: u32,
}

impl TimespecLayout {
    /// Two consecutive fields of type `field` with natural alignment.
    ///
    /// Only `Int32` and `Int64` fields are meaningful; any other kind falls
    /// back to `Int64`.
    pub fn packed(field: LogicalType) -> Self {
        let field = match field {
            LogicalType::Int32 => LogicalType::Int32,
            _ => LogicalType::Int64,
        };
        let width = field.bytes().unwrap_or(8);
        Self { field, seconds_offset: 0, nanos_offset: width as i32, size: width * 2, align: width }
    }

    /// Layout used by C libraries for a target with the given pointer width.
    pub fn for_pointer_bits(bits: u32) -> Self {
        if bits <= 32 { Self::packed(LogicalType::Int32) } else { Self::packed(LogicalType::Int64) }
    }

    /// Integer type of both fields.
    pub fn field(&self) -> &LogicalType {
        &self.field
    }

    pub const fn seconds_offset(&self) -> i32 {
        self.seconds_offset
    }

    pub const fn nanos_offset(&self) -> i32 {
        self.nanos_offset
    }

    pub const fn size(&self) -> u32 {
        self.size
    }

    /// log2 of the alignment, as expected by stack-slot allocation.
    pub const fn align_shift(&self) -> u8 {
        self.align.trailing_zeros() as u8
    }
}
