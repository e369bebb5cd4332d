//! Dense linear-algebra kernels: GEMV and GEMM.
//!
//! Every kernel either binds to a CBLAS entry point (`cblas_sgemv`, ...) or
//! is synthesized into the module as a fallback (`noblas_sgemv`, ...). Both
//! share the CBLAS argument order:
//!
//! ```text
//! gemv(order, trans, m, n, alpha, A, lda, x, incx, beta, y, incy) -> i32
//! gemm(order, transA, transB, m, n, k, alpha, A, lda, B, ldb, beta, C, ldc) -> i32
//! ```
//!
//! # Fallback caveats
//!
//! The fallback kernels do not implement full BLAS semantics:
//!
//! - GEMV ignores `order`, `trans`, `alpha` and `beta`: `y[i*incy] = sum_j A[i*lda + j] * x[j*incx]`.
//! - GEMM ignores `order`, `alpha` and `beta`, but honours both transpose
//!   flags (`CblasTrans` means transposed): `C = op(A) * op(B)`.
//!
//! Callers relying on `alpha != 1` or `beta != 0` get the unscaled product.
//! Neither kernel validates dimensions or strides; both return 0.

use cranelift_codegen::ir::{InstBuilder, Value};
use cranelift_module::{FuncId, Linkage, Module};
use ember_dtype::LogicalType;
use tracing::debug;

use super::RuntimeProvider;
use crate::emitter::FunctionEmitter;
use crate::error::{Result, UnsupportedTypeSnafu};
use crate::symbols::FunctionKey;
use crate::types::FunctionSignature;

pub const CBLAS_ROW_MAJOR: i32 = 101;
pub const CBLAS_COL_MAJOR: i32 = 102;
pub const CBLAS_NO_TRANS: i32 = 111;
pub const CBLAS_TRANS: i32 = 112;

const OPENBLAS_GET_NUM_THREADS: &str = "openblas_get_num_threads";
const OPENBLAS_SET_NUM_THREADS: &str = "openblas_set_num_threads";

/// Where a linear-algebra kernel comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KernelBinding {
    /// Declare the CBLAS symbol; the library is linked by the embedder.
    External,
    /// Synthesize the `noblas_*` fallback into the module.
    #[default]
    Native,
}

/// GEMV/GEMM request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDescriptor {
    pub element: LogicalType,
    /// `None` uses the provider's configured default.
    pub binding: Option<KernelBinding>,
}

impl KernelDescriptor {
    pub fn new(element: LogicalType) -> Self {
        Self { element, binding: None }
    }

    pub fn with_binding(mut self, binding: KernelBinding) -> Self {
        self.binding = Some(binding);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    Gemv,
    Gemm,
}

impl Kernel {
    const fn name(self) -> &'static str {
        match self {
            Self::Gemv => "gemv",
            Self::Gemm => "gemm",
        }
    }

    /// BLAS precision prefix for `elem`.
    fn prefix(self, elem: &LogicalType) -> Result<char> {
        match elem {
            LogicalType::Float32 => Ok('s'),
            LogicalType::Float64 => Ok('d'),
            other => UnsupportedTypeSnafu { operation: self.name(), ty: other.clone() }.fail(),
        }
    }

    fn symbol(self, elem: &LogicalType, binding: KernelBinding) -> Result<String> {
        let prefix = self.prefix(elem)?;
        let library = match binding {
            KernelBinding::External => "cblas",
            KernelBinding::Native => "noblas",
        };
        Ok(format!("{library}_{prefix}{}", self.name()))
    }

    fn signature(self, elem: &LogicalType) -> FunctionSignature {
        match self {
            Self::Gemv => gemv_signature(elem),
            Self::Gemm => gemm_signature(elem),
        }
    }
}

/// CBLAS GEMV signature for element type `elem`.
pub fn gemv_signature(elem: &LogicalType) -> FunctionSignature {
    let int = || LogicalType::Int32;
    let scalar = || elem.clone();
    let array = || elem.clone().ptr();
    FunctionSignature::returning(
        vec![int(), int(), int(), int(), scalar(), array(), int(), array(), int(), scalar(), array(), int()],
        LogicalType::Int32,
    )
}

/// CBLAS GEMM signature for element type `elem`.
pub fn gemm_signature(elem: &LogicalType) -> FunctionSignature {
    let int = || LogicalType::Int32;
    let scalar = || elem.clone();
    let array = || elem.clone().ptr();
    FunctionSignature::returning(
        vec![int(), int(), int(), int(), int(), int(), scalar(), array(), int(), array(), int(), scalar(), array(), int()],
        LogicalType::Int32,
    )
}

impl<M: Module> RuntimeProvider<'_, M> {
    pub fn sgemv_function(&mut self, binding: KernelBinding) -> Result<FuncId> {
        self.gemv_function(&LogicalType::Float32, binding)
    }

    pub fn dgemv_function(&mut self, binding: KernelBinding) -> Result<FuncId> {
        self.gemv_function(&LogicalType::Float64, binding)
    }

    pub fn sgemm_function(&mut self, binding: KernelBinding) -> Result<FuncId> {
        self.gemm_function(&LogicalType::Float32, binding)
    }

    pub fn dgemm_function(&mut self, binding: KernelBinding) -> Result<FuncId> {
        self.gemm_function(&LogicalType::Float64, binding)
    }

    /// GEMV for `Float32` or `Float64`; other element types fail with `UnsupportedType`.
    pub fn gemv_function(&mut self, elem: &LogicalType, binding: KernelBinding) -> Result<FuncId> {
        self.kernel_function(Kernel::Gemv, elem, binding)
    }

    /// GEMM for `Float32` or `Float64`; other element types fail with `UnsupportedType`.
    pub fn gemm_function(&mut self, elem: &LogicalType, binding: KernelBinding) -> Result<FuncId> {
        self.kernel_function(Kernel::Gemm, elem, binding)
    }

    /// GEMV described by `desc`, falling back to the configured binding.
    pub fn gemv(&mut self, desc: &KernelDescriptor) -> Result<FuncId> {
        let binding = desc.binding.unwrap_or(self.config.default_binding);
        self.gemv_function(&desc.element, binding)
    }

    /// GEMM described by `desc`, falling back to the configured binding.
    pub fn gemm(&mut self, desc: &KernelDescriptor) -> Result<FuncId> {
        let binding = desc.binding.unwrap_or(self.config.default_binding);
        self.gemm_function(&desc.element, binding)
    }

    /// `int openblas_get_num_threads()`, using the target's native int.
    pub fn openblas_get_num_threads_function(&mut self) -> Result<FuncId> {
        self.declare_external(OPENBLAS_GET_NUM_THREADS, FunctionSignature::returning(vec![], LogicalType::NativeInt))
    }

    /// `void openblas_set_num_threads(int)`, using the target's native int.
    pub fn openblas_set_num_threads_function(&mut self) -> Result<FuncId> {
        self.declare_external(OPENBLAS_SET_NUM_THREADS, FunctionSignature::void(vec![LogicalType::NativeInt]))
    }

    fn kernel_function(&mut self, kernel: Kernel, elem: &LogicalType, binding: KernelBinding) -> Result<FuncId> {
        let symbol = kernel.symbol(elem, binding)?;
        let sig = kernel.signature(elem);

        if binding == KernelBinding::External {
            return self.declare_external(&symbol, sig);
        }

        let elem = elem.clone();
        self.get_or_materialize(FunctionKey::global(symbol), |emitter, name| {
            debug!(function = name, kernel = kernel.name(), element = %elem, "synthesizing fallback kernel");
            emitter.define_function(name, &sig, Linkage::Local, |fe| match kernel {
                Kernel::Gemv => emit_gemv(fe, &elem),
                Kernel::Gemm => emit_gemm(fe, &elem),
            })
        })
    }
}

/// `y[i*incy] = sum_j A[i*lda + j] * x[j*incx]` for `i in 0..m`.
fn emit_gemv<M: Module>(fe: &mut FunctionEmitter<'_, M>, elem: &LogicalType) -> Result<()> {
    // order, trans, alpha and beta (params 0, 1, 4, 9) are not applied.
    let m = fe.param(2);
    let n = fe.param(3);
    let a = fe.param(5);
    let lda = fe.param(6);
    let x = fe.param(7);
    let incx = fe.param(8);
    let y = fe.param(10);
    let incy = fe.param(11);

    let zero = fe.zero(elem);
    let accum = fe.local(elem, zero);

    fe.for_range(m, |fe, i| {
        let zero = fe.zero(elem);
        fe.set_local(accum, zero);

        fe.for_range(n, |fe, j| {
            let a_index = fe.mul_add(i, lda, j);
            let x_index = fe.ins().imul(j, incx);
            let a_val = fe.load_element(elem, a, a_index);
            let x_val = fe.load_element(elem, x, x_index);
            let product = fe.mul(elem, a_val, x_val);
            let acc = fe.get_local(accum);
            let acc = fe.add(elem, acc, product);
            fe.set_local(accum, acc);
            Ok(())
        })?;

        let y_index = fe.ins().imul(i, incy);
        let acc = fe.get_local(accum);
        fe.store_element(elem, y, y_index, acc);
        Ok(())
    })?;

    let status = fe.int_const(&LogicalType::Int32, 0);
    fe.ret(&[status]);
    Ok(())
}

/// `C[i*ldc + j] += op(A)[i, k] * op(B)[k, j]` after zeroing `m*ldc` elements of `C`.
///
/// Loop nest is row, contraction, column. Operand offsets are chosen with a
/// `select` on the runtime transpose flags.
fn emit_gemm<M: Module>(fe: &mut FunctionEmitter<'_, M>, elem: &LogicalType) -> Result<()> {
    // order, alpha and beta (params 0, 6, 11) are not applied.
    let trans_a = fe.param(1);
    let trans_b = fe.param(2);
    let m = fe.param(3);
    let n = fe.param(4);
    let k = fe.param(5);
    let a = fe.param(7);
    let lda = fe.param(8);
    let b = fe.param(9);
    let ldb = fe.param(10);
    let c = fe.param(12);
    let ldc = fe.param(13);

    let trans_a = fe.equals_imm(trans_a, i64::from(CBLAS_TRANS));
    let trans_b = fe.equals_imm(trans_b, i64::from(CBLAS_TRANS));

    let count = fe.ins().imul(ldc, m);
    fe.for_range(count, |fe, index| {
        let zero = fe.zero(elem);
        fe.store_element(elem, c, index, zero);
        Ok(())
    })?;

    fe.for_range(m, |fe, i| {
        fe.for_range(k, |fe, p| {
            fe.for_range(n, |fe, j| {
                let a_offset = transposed_offset(fe, trans_a, (p, lda, i), (i, lda, p));
                let b_offset = transposed_offset(fe, trans_b, (j, ldb, p), (p, ldb, j));
                let c_offset = fe.mul_add(i, ldc, j);

                let a_val = fe.load_element(elem, a, a_offset);
                let b_val = fe.load_element(elem, b, b_offset);
                let c_val = fe.load_element(elem, c, c_offset);
                let product = fe.mul(elem, a_val, b_val);
                let sum = fe.add(elem, c_val, product);
                fe.store_element(elem, c, c_offset, sum);
                Ok(())
            })
        })
    })?;

    let status = fe.int_const(&LogicalType::Int32, 0);
    fe.ret(&[status]);
    Ok(())
}

/// `flag ? t.0*t.1 + t.2 : n.0*n.1 + n.2`, both offsets computed then selected.
fn transposed_offset<M: Module>(
    fe: &mut FunctionEmitter<'_, M>,
    flag: Value,
    transposed: (Value, Value, Value),
    normal: (Value, Value, Value),
) -> Value {
    let transposed = fe.mul_add(transposed.0, transposed.1, transposed.2);
    let normal = fe.mul_add(normal.0, normal.1, normal.2);
    fe.select(flag, transposed, normal)
}
