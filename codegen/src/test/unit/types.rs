use cranelift_codegen::ir::types;
use ember_device::{NativeIntWidth, OsFamily, TargetDescriptor};
use ember_dtype::LogicalType;
use test_case::test_case;

use crate::test::jit_emitter;
use crate::types::{FunctionSignature, TypeLowering, native_int_type};

#[test_case(NativeIntWidth::Unspecified, types::I32; "unspecified defaults to 32")]
#[test_case(NativeIntWidth::Bits8, types::I8; "8 bits")]
#[test_case(NativeIntWidth::Bits16, types::I16; "16 bits")]
#[test_case(NativeIntWidth::Bits32, types::I32; "32 bits")]
#[test_case(NativeIntWidth::Bits64, types::I64; "64 bits")]
fn test_native_int_type(width: NativeIntWidth, expected: cranelift_codegen::ir::Type) {
    assert_eq!(native_int_type(width), expected);

    let target = TargetDescriptor::new(OsFamily::Posix, width);
    assert_eq!(TypeLowering::new(&target, types::I64).lower(&LogicalType::NativeInt), expected);
}

#[test]
fn test_lowering_is_target_resolved() {
    let lowering = TypeLowering::new(&TargetDescriptor::default(), types::I32);
    assert_eq!(lowering.lower(&LogicalType::Float32), types::F32);
    assert_eq!(lowering.lower(&LogicalType::Int64), types::I64);
    assert_eq!(lowering.lower(&LogicalType::Float64.ptr()), types::I32);
    assert_eq!(lowering.bytes(&LogicalType::Float64), 8);
}

#[test]
fn test_signature_lowering() {
    let emitter = jit_emitter("types", TargetDescriptor::default());
    let pointer = emitter.lowering().pointer();

    let sig = FunctionSignature::void(vec![LogicalType::Int32, LogicalType::Float64.ptr()]);
    let lowered = emitter.signature(&sig);
    assert_eq!(lowered.params.len(), 2);
    assert_eq!(lowered.params[0].value_type, types::I32);
    assert_eq!(lowered.params[1].value_type, pointer);
    assert!(lowered.returns.is_empty());

    let sig = FunctionSignature::returning(vec![], LogicalType::Float64);
    assert_eq!(emitter.signature(&sig).returns[0].value_type, types::F64);
}
