//! Native signatures of provisioned functions, for calling finalized code.
//!
//! The module's default calling convention is the platform C convention, so
//! every function is reachable through an `extern "C"` pointer.

/// `void <module>_DotProductFloat(int, double*, double*, double*)`.
pub type DotProductFloatFn = unsafe extern "C" fn(i32, *const f64, *const f64, *mut f64);

/// `void <module>_DotProductInt(int, int*, int*, int*)`.
pub type DotProductIntFn = unsafe extern "C" fn(i32, *const i32, *const i32, *mut i32);

/// `double <module>_GetTime()`.
pub type GetTimeFn = unsafe extern "C" fn() -> f64;

/// `int clock_gettime(int, struct timespec*)` with 64-bit fields.
pub type ClockGettimeFn = unsafe extern "C" fn(i32, *mut [i64; 2]) -> i32;

/// Unary math function over `T`.
pub type UnaryFn<T> = unsafe extern "C" fn(T) -> T;

/// `gemv(order, trans, m, n, alpha, A, lda, x, incx, beta, y, incy) -> int`.
pub type GemvFn<T> = unsafe extern "C" fn(i32, i32, i32, i32, T, *const T, i32, *const T, i32, T, *mut T, i32) -> i32;

/// `gemm(order, transA, transB, m, n, k, alpha, A, lda, B, ldb, beta, C, ldc) -> int`.
pub type GemmFn<T> =
    unsafe extern "C" fn(i32, i32, i32, i32, i32, i32, T, *const T, i32, *const T, i32, T, *mut T, i32) -> i32;
