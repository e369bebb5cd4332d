//! Provider configuration.
//!
//! Typed configuration with a bon builder and environment-variable fallback.

use bon::bon;

use crate::provider::KernelBinding;

/// Configuration of a [`RuntimeProvider`](crate::RuntimeProvider).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Binding used by GEMV/GEMM requests that do not name one.
    pub default_binding: KernelBinding,
}

#[bon]
impl ProviderConfig {
    /// Create a provider configuration; `ProviderConfig::builder()` is generated from this.
    #[builder]
    pub fn new(#[builder(default)] default_binding: KernelBinding) -> Self {
        Self { default_binding }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `EMBER_USE_BLAS` - `1`/`true` binds linear-algebra kernels to an
    ///   external BLAS (default: synthesized fallback kernels)
    pub fn from_env() -> Self {
        let default_binding = match std::env::var("EMBER_USE_BLAS").as_deref() {
            Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") => KernelBinding::External,
            _ => KernelBinding::Native,
        };

        Self { default_binding }
    }
}
