//! Host symbols made visible to JIT-compiled code.

use cranelift_jit::JITBuilder;
use tracing::trace;

/// Name-to-address table registered with the JIT before any module code is
/// compiled. Symbols not listed here are looked up in the running process.
#[derive(Debug, Clone, Default)]
pub struct HostSymbols {
    symbols: Vec<(String, *const u8)>,
}

macro_rules! c_runtime_shims {
    ($($symbol:literal => $shim:ident($ty:ty) = $method:ident;)*) => {
        $(
            extern "C" fn $shim(x: $ty) -> $ty {
                x.$method()
            }
        )*

        fn c_runtime_symbols() -> Vec<(&'static str, *const u8)> {
            vec![$(($symbol, $shim as *const u8)),*]
        }
    };
}

c_runtime_shims! {
    "tanhf" => host_tanhf(f32) = tanh;
    "tanh" => host_tanh(f64) = tanh;
    "expf" => host_expf(f32) = exp;
    "exp" => host_exp(f64) = exp;
    "logf" => host_logf(f32) = ln;
    "log" => host_log(f64) = ln;
    "sinf" => host_sinf(f32) = sin;
    "sin" => host_sin(f64) = sin;
    "cosf" => host_cosf(f32) = cos;
    "cos" => host_cos(f64) = cos;
}

impl HostSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// C-runtime math functions implemented by the Rust standard library.
    ///
    /// Independent of which libm (if any) the host process exports.
    pub fn with_c_runtime() -> Self {
        let mut symbols = Self::new();
        for (name, ptr) in c_runtime_symbols() {
            symbols = symbols.with(name, ptr);
        }
        symbols
    }

    /// Add or replace `name`.
    pub fn with(mut self, name: impl Into<String>, ptr: *const u8) -> Self {
        let name = name.into();
        self.symbols.retain(|(existing, _)| *existing != name);
        self.symbols.push((name, ptr));
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub(crate) fn register(&self, builder: &mut JITBuilder) {
        for (name, ptr) in &self.symbols {
            trace!(symbol = %name, "registering host symbol");
            builder.symbol(name.clone(), *ptr);
        }
    }
}
