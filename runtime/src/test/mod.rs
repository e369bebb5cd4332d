
use cranelift_codegen::ir::Value;
use cranelift_jit::JITModule;
use cranelift_module::{FuncId, Linkage};
use ember_codegen::{FunctionSignature, ModuleEmitter};

/// Define `name` as a local function that forwards its arguments to `callee`.
///
/// Imported functions have no address inside the JIT module; calling them
/// through a defined function exercises the declaration end to end.
pub fn forwarding_function(
    emitter: &mut ModuleEmitter<JITModule>,
    name: &str,
    callee: FuncId,
    sig: &FunctionSignature,
) -> FuncId {
    let arity = sig.params.len();
    emitter
        .define_function(name, sig, Linkage::Local, |fe| {
            let args: Vec<Value> = (0..arity).map(|i| fe.param(i)).collect();
            let results = fe.call(callee, &args);
            fe.ret(&results);
            Ok(())
        })
        .expect("forwarding function")
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!((actual - expected).abs() <= tolerance, "expected {expected}, got {actual} (tolerance {tolerance})");
}
