//! External bindings resolved against recording stand-ins.

use std::cell::{Cell, RefCell};

use ember_codegen::{
    CBLAS_NO_TRANS, CBLAS_ROW_MAJOR, CBLAS_TRANS, FunctionSignature, KernelBinding, gemm_signature, gemv_signature,
};
use ember_device::TargetDescriptor;
use ember_dtype::{HasLogicalType, LogicalType};

use crate::abi::{GemmFn, GemvFn};
use crate::test::forwarding_function;
use crate::{HostSymbols, JitSession};

#[derive(Debug, Clone, PartialEq)]
struct GemvCall {
    order: i32,
    trans: i32,
    m: i32,
    n: i32,
    alpha: f32,
    lda: i32,
    beta: f32,
}

thread_local! {
    static SGEMV_CALLS: RefCell<Vec<GemvCall>> = const { RefCell::new(Vec::new()) };
    static DGEMM_DIMS: RefCell<Vec<(i32, i32, i32, i32, i32)>> = const { RefCell::new(Vec::new()) };
    static THREADS: Cell<i32> = const { Cell::new(1) };
}

#[allow(clippy::too_many_arguments)]
extern "C" fn fake_cblas_sgemv(
    order: i32,
    trans: i32,
    m: i32,
    n: i32,
    alpha: f32,
    _a: *const f32,
    lda: i32,
    _x: *const f32,
    _incx: i32,
    beta: f32,
    _y: *mut f32,
    _incy: i32,
) -> i32 {
    SGEMV_CALLS.with(|calls| calls.borrow_mut().push(GemvCall { order, trans, m, n, alpha, lda, beta }));
    7
}

#[allow(clippy::too_many_arguments)]
extern "C" fn fake_cblas_dgemm(
    _order: i32,
    trans_a: i32,
    trans_b: i32,
    m: i32,
    n: i32,
    k: i32,
    _alpha: f64,
    _a: *const f64,
    _lda: i32,
    _b: *const f64,
    _ldb: i32,
    _beta: f64,
    c: *mut f64,
    _ldc: i32,
) -> i32 {
    DGEMM_DIMS.with(|dims| dims.borrow_mut().push((trans_a, trans_b, m, n, k)));
    unsafe { *c = -1.0 };
    0
}

extern "C" fn fake_openblas_get_num_threads() -> i32 {
    THREADS.with(Cell::get)
}

extern "C" fn fake_openblas_set_num_threads(threads: i32) {
    THREADS.with(|t| t.set(threads));
}

#[test]
fn test_external_sgemv_passes_arguments_through() {
    let host = HostSymbols::new().with("cblas_sgemv", fake_cblas_sgemv as *const u8);
    let mut session = JitSession::new("blas", TargetDescriptor::host(), &host).unwrap();
    let cblas = session.provider().sgemv_function(KernelBinding::External).unwrap();
    let call = forwarding_function(session.emitter(), "call_sgemv", cblas, &gemv_signature(&f32::LOGICAL_TYPE));
    let compiled = session.finalize().unwrap();

    let sgemv = unsafe { compiled.function::<GemvFn<f32>>(call) }.unwrap();
    let mut y = [0.0f32; 2];
    let status = unsafe {
        sgemv(CBLAS_ROW_MAJOR, CBLAS_TRANS, 2, 3, 1.5, std::ptr::null(), 3, std::ptr::null(), 1, 0.25, y.as_mut_ptr(), 1)
    };

    assert_eq!(status, 7);
    let calls = SGEMV_CALLS.with(|calls| calls.borrow().clone());
    assert_eq!(
        calls,
        vec![GemvCall { order: CBLAS_ROW_MAJOR, trans: CBLAS_TRANS, m: 2, n: 3, alpha: 1.5, lda: 3, beta: 0.25 }]
    );
}

#[test]
fn test_external_dgemm_is_not_synthesized() {
    let host = HostSymbols::new().with("cblas_dgemm", fake_cblas_dgemm as *const u8);
    let mut session = JitSession::new("blas", TargetDescriptor::host(), &host).unwrap();
    let cblas = session.provider().dgemm_function(KernelBinding::External).unwrap();
    assert!(session.emitter().lookup("noblas_dgemm").is_none());

    let call = forwarding_function(session.emitter(), "call_dgemm", cblas, &gemm_signature(&f64::LOGICAL_TYPE));
    let compiled = session.finalize().unwrap();

    let dgemm = unsafe { compiled.function::<GemmFn<f64>>(call) }.unwrap();
    let mut c = [0.0];
    unsafe {
        dgemm(CBLAS_ROW_MAJOR, CBLAS_NO_TRANS, CBLAS_TRANS, 1, 1, 4, 1.0, std::ptr::null(), 4, std::ptr::null(), 4, 0.0, c.as_mut_ptr(), 1)
    };

    assert_eq!(c, [-1.0]);
    assert_eq!(DGEMM_DIMS.with(|dims| dims.borrow().clone()), vec![(CBLAS_NO_TRANS, CBLAS_TRANS, 1, 1, 4)]);
}

#[test]
fn test_openblas_thread_control() {
    let host = HostSymbols::new()
        .with("openblas_get_num_threads", fake_openblas_get_num_threads as *const u8)
        .with("openblas_set_num_threads", fake_openblas_set_num_threads as *const u8);
    let mut session = JitSession::new("blas", TargetDescriptor::host(), &host).unwrap();

    let (get, set) = {
        let mut provider = session.provider();
        (provider.openblas_get_num_threads_function().unwrap(), provider.openblas_set_num_threads_function().unwrap())
    };
    let get = forwarding_function(session.emitter(), "call_get", get, &FunctionSignature::returning(vec![], LogicalType::NativeInt));
    let set = forwarding_function(session.emitter(), "call_set", set, &FunctionSignature::void(vec![LogicalType::NativeInt]));
    let compiled = session.finalize().unwrap();

    let get = unsafe { compiled.function::<unsafe extern "C" fn() -> i32>(get) }.unwrap();
    let set = unsafe { compiled.function::<unsafe extern "C" fn(i32)>(set) }.unwrap();
    unsafe {
        assert_eq!(get(), 1);
        set(6);
        assert_eq!(get(), 6);
    }
}
