use cranelift_jit::JITModule;
use cranelift_module::{FuncId, Linkage, Module};
use ember_device::TargetDescriptor;
use ember_dtype::LogicalType;
use test_case::test_case;

use crate::test::jit_emitter;
use crate::{Error, MathFunction, ModuleEmitter, RuntimeProvider};

fn linkage(emitter: &ModuleEmitter<JITModule>, id: FuncId) -> Linkage {
    emitter.module().declarations().get_function_decl(id).linkage
}

#[test_case(MathFunction::Tanh, LogicalType::Float32, "tanhf", Linkage::Import; "tanhf")]
#[test_case(MathFunction::Tanh, LogicalType::Float64, "tanh", Linkage::Import; "tanh")]
#[test_case(MathFunction::Exp, LogicalType::Float32, "expf", Linkage::Import; "expf")]
#[test_case(MathFunction::Log, LogicalType::Float64, "log", Linkage::Import; "log")]
#[test_case(MathFunction::Sin, LogicalType::Float32, "sinf", Linkage::Import; "sinf")]
#[test_case(MathFunction::Cos, LogicalType::Float64, "cos", Linkage::Import; "cos")]
#[test_case(MathFunction::Sqrt, LogicalType::Float32, "intrinsic.sqrt.f32", Linkage::Local; "sqrt f32")]
#[test_case(MathFunction::Abs, LogicalType::Float64, "intrinsic.fabs.f64", Linkage::Local; "fabs f64")]
fn test_math_symbol(function: MathFunction, ty: LogicalType, symbol: &str, expected: Linkage) {
    let mut emitter = jit_emitter("math", TargetDescriptor::default());
    let id = RuntimeProvider::new(&mut emitter).math_function(function, &ty).expect("float math resolves");

    assert_eq!(emitter.lookup(symbol), Some(id));
    assert_eq!(linkage(&emitter, id), expected);
}

#[test_case(LogicalType::Int32; "int32")]
#[test_case(LogicalType::Int64; "int64")]
#[test_case(LogicalType::Float32.ptr(); "pointer")]
fn test_tanh_rejects_non_float(ty: LogicalType) {
    let mut emitter = jit_emitter("math", TargetDescriptor::default());
    let err = RuntimeProvider::new(&mut emitter).tanh_function(&ty).unwrap_err();

    assert!(matches!(err, Error::UnsupportedType { operation: "tanh", .. }), "unexpected error: {err}");
    assert!(emitter.lookup("tanh").is_none());
}

#[test]
fn test_every_math_function_rejects_integers() {
    let mut emitter = jit_emitter("math", TargetDescriptor::default());
    let mut provider = RuntimeProvider::new(&mut emitter);

    assert!(matches!(provider.sqrt_function(&LogicalType::Int64), Err(Error::UnsupportedType { .. })));
    assert!(matches!(provider.abs_function(&LogicalType::Int32), Err(Error::UnsupportedType { .. })));
    assert!(matches!(provider.exp_function(&LogicalType::Int32), Err(Error::UnsupportedType { .. })));
    assert!(matches!(provider.log_function(&LogicalType::Int32), Err(Error::UnsupportedType { .. })));
    assert!(matches!(provider.sin_function(&LogicalType::Int32), Err(Error::UnsupportedType { .. })));
    assert!(matches!(provider.cos_function(&LogicalType::Int32), Err(Error::UnsupportedType { .. })));
}

#[test]
fn test_math_is_idempotent() {
    let mut emitter = jit_emitter("math", TargetDescriptor::default());
    let mut provider = RuntimeProvider::new(&mut emitter);

    let first = provider.sqrt_function(&LogicalType::Float64).unwrap();
    let second = provider.sqrt_function(&LogicalType::Float64).unwrap();
    let single = provider.sqrt_function(&LogicalType::Float32).unwrap();

    assert_eq!(first, second);
    assert_ne!(first, single);
}
