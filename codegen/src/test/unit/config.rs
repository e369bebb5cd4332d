use crate::config::ProviderConfig;
use crate::provider::KernelBinding;

#[test]
fn test_default_binding_is_native() {
    assert_eq!(ProviderConfig::default().default_binding, KernelBinding::Native);
    assert_eq!(ProviderConfig::builder().build(), ProviderConfig::default());
}

#[test]
fn test_builder_overrides_binding() {
    let config = ProviderConfig::builder().default_binding(KernelBinding::External).build();
    assert_eq!(config.default_binding, KernelBinding::External);
}
