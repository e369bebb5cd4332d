use cranelift_module::{Linkage, Module};
use ember_device::TargetDescriptor;
use ember_dtype::LogicalType;

use crate::error::UnsupportedTypeSnafu;
use crate::test::jit_emitter;
use crate::{Error, KernelBinding, RuntimeProvider, gemv_signature};

#[test]
fn test_namespace_prefix_is_module_name() {
    let mut emitter = jit_emitter("mnist", TargetDescriptor::default());
    let mut provider = RuntimeProvider::new(&mut emitter);
    assert_eq!(provider.namespace_prefix(), "mnist");

    let float = provider.dot_product_float_function().unwrap();
    let int = provider.dot_product_int_function().unwrap();
    assert_ne!(float, int);

    assert_eq!(emitter.lookup("mnist_DotProductFloat"), Some(float));
    assert_eq!(emitter.lookup("mnist_DotProductInt"), Some(int));
    let decls = emitter.module().declarations();
    assert_eq!(decls.get_function_decl(float).linkage, Linkage::Export);
    assert_eq!(decls.get_function_decl(int).linkage, Linkage::Export);
    assert_eq!(decls.get_function_decl(int).signature.params.len(), 4);
    assert!(decls.get_function_decl(int).signature.returns.is_empty());
}

#[test]
fn test_repeated_requests_author_one_body() {
    let mut emitter = jit_emitter("model", TargetDescriptor::default());
    let mut provider = RuntimeProvider::new(&mut emitter);

    let first = provider.dot_product_float_function().unwrap();
    let cached = provider.symbols().len();
    let second = provider.dot_product_float_function().unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.symbols().len(), cached);
}

#[test]
fn test_independent_providers_share_module_functions() {
    let mut emitter = jit_emitter("model", TargetDescriptor::default());

    let (dot, gemv, tanh) = {
        let mut provider = RuntimeProvider::new(&mut emitter);
        (
            provider.dot_product_int_function().unwrap(),
            provider.sgemv_function(KernelBinding::Native).unwrap(),
            provider.tanh_function(&ember_dtype::LogicalType::Float32).unwrap(),
        )
    };
    let declared = emitter.module().declarations().get_functions().count();

    // A fresh provider has an empty cache but must find the existing
    // definitions instead of defining them again.
    let mut provider = RuntimeProvider::new(&mut emitter);
    assert!(provider.symbols().is_empty());
    assert_eq!(provider.dot_product_int_function().unwrap(), dot);
    assert_eq!(provider.sgemv_function(KernelBinding::Native).unwrap(), gemv);
    assert_eq!(provider.tanh_function(&ember_dtype::LogicalType::Float32).unwrap(), tanh);
    assert_eq!(provider.symbols().len(), 3);

    assert_eq!(emitter.module().declarations().get_functions().count(), declared);
}

#[test]
fn test_failed_body_leaves_name_free() {
    let mut emitter = jit_emitter("model", TargetDescriptor::default());
    let sig = gemv_signature(&LogicalType::Float32);

    let result = emitter.define_function("noblas_sgemv", &sig, Linkage::Local, |_| {
        UnsupportedTypeSnafu { operation: "gemv", ty: LogicalType::Int32 }.fail()
    });
    assert!(matches!(result, Err(Error::UnsupportedType { .. })));
    assert!(emitter.lookup("noblas_sgemv").is_none());

    let id = RuntimeProvider::new(&mut emitter).sgemv_function(KernelBinding::Native).unwrap();
    assert_eq!(emitter.lookup("noblas_sgemv"), Some(id));

    let mut module = emitter.into_module();
    module.finalize_definitions().unwrap();
    assert!(!module.get_finalized_function(id).is_null());
}
