//! OS family and integer width of the compilation target.

/// Operating-system family of the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Provides `clock_gettime` and a C runtime.
    #[default]
    Posix,

    /// Provides the Win32 performance-counter API instead of `clock_gettime`.
    Windows,
}

impl OsFamily {
    /// Family of the machine running the compiler.
    pub const fn host() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Posix }
    }

    /// Parse a family name (`posix`, `linux`, `macos`, `windows`, `win32`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "posix" | "linux" | "macos" | "unix" => Some(Self::Posix),
            "windows" | "win32" | "win" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// Native signed-integer width of the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NativeIntWidth {
    /// Width not specified: integers default to 32 bits.
    #[default]
    Unspecified,
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl NativeIntWidth {
    /// Map a bit count to a width. `0` means unspecified.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Unspecified),
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }

    /// Parse a bit count such as `"64"`.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u32>().ok().and_then(Self::from_bits)
    }

    /// Bit count, `0` when unspecified.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// Bit count actually used for native integers.
    pub const fn effective_bits(self) -> u32 {
        match self {
            Self::Unspecified => 32,
            other => other.bits(),
        }
    }
}

/// Immutable description of the compilation target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    os: OsFamily,
    int_width: NativeIntWidth,
}

impl TargetDescriptor {
    pub const fn new(os: OsFamily, int_width: NativeIntWidth) -> Self {
        Self { os, int_width }
    }

    /// Descriptor for the machine running the compiler, with the default integer width.
    pub const fn host() -> Self {
        Self::new(OsFamily::host(), NativeIntWidth::Unspecified)
    }

    /// Host descriptor with environment overrides.
    ///
    /// # Environment Variables
    ///
    /// * `EMBER_TARGET_OS` - `posix` or `windows` (default: host)
    /// * `EMBER_TARGET_INT_BITS` - 0, 8, 16, 32 or 64 (default: 0)
    pub fn from_env() -> Self {
        let os = match std::env::var("EMBER_TARGET_OS") {
            Ok(name) => OsFamily::parse(&name).unwrap_or_else(|| {
                tracing::warn!(value = %name, "ignoring unrecognized EMBER_TARGET_OS");
                OsFamily::host()
            }),
            Err(_) => OsFamily::host(),
        };
        let int_width = match std::env::var("EMBER_TARGET_INT_BITS") {
            Ok(bits) => NativeIntWidth::parse(&bits).unwrap_or_else(|| {
                tracing::warn!(value = %bits, "ignoring unsupported EMBER_TARGET_INT_BITS");
                NativeIntWidth::default()
            }),
            Err(_) => NativeIntWidth::default(),
        };

        Self { os, int_width }
    }

    pub const fn with_os(mut self, os: OsFamily) -> Self {
        self.os = os;
        self
    }

    pub const fn with_int_width(mut self, int_width: NativeIntWidth) -> Self {
        self.int_width = int_width;
        self
    }

    pub const fn os(&self) -> OsFamily {
        self.os
    }

    pub const fn int_width(&self) -> NativeIntWidth {
        self.int_width
    }

    pub const fn is_windows(&self) -> bool {
        matches!(self.os, OsFamily::Windows)
    }
}
