//! Body emission for a single function.

use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::instructions::BlockArg;
use cranelift_codegen::ir::{InstBuilder, MemFlags, StackSlotData, StackSlotKind, Type, Value};
use cranelift_frontend::{FuncInstBuilder, FunctionBuilder, Variable};
use cranelift_module::{FuncId, Module};
use ember_dtype::LogicalType;
use snafu::OptionExt;

use crate::error::{NoReturnValueSnafu, Result};
use crate::types::TypeLowering;

/// Emits the body of the function currently open in a [`ModuleEmitter`](super::ModuleEmitter).
///
/// The entry block is created and sealed on construction; parameters are
/// available through [`param`](Self::param). Integer arithmetic on indices is
/// done at the width of the operands; addresses are formed at pointer width.
pub struct FunctionEmitter<'a, M: Module> {
    builder: FunctionBuilder<'a>,
    module: &'a mut M,
    lowering: TypeLowering,
    params: Vec<Value>,
}

impl<'a, M: Module> FunctionEmitter<'a, M> {
    pub(super) fn new(mut builder: FunctionBuilder<'a>, module: &'a mut M, lowering: TypeLowering) -> Self {
        let entry = builder.create_block();
        builder.append_block_params_for_function_params(entry);
        builder.switch_to_block(entry);
        builder.seal_block(entry);
        let params = builder.block_params(entry).to_vec();

        Self { builder, module, lowering, params }
    }

    pub(super) fn finalize(mut self) {
        self.builder.seal_all_blocks();
        self.builder.finalize();
    }

    /// Raw instruction builder at the current position.
    pub fn ins<'short>(&'short mut self) -> FuncInstBuilder<'short, 'a> {
        self.builder.ins()
    }

    /// `index`-th function parameter.
    ///
    /// # Panics
    ///
    /// Panics if the signature has fewer parameters.
    pub fn param(&self, index: usize) -> Value {
        self.params[index]
    }

    pub fn lowering(&self) -> TypeLowering {
        self.lowering
    }

    pub fn lower(&self, ty: &LogicalType) -> Type {
        self.lowering.lower(ty)
    }

    // ------------------------------------------------------------------
    // Constants
    // ------------------------------------------------------------------

    pub fn int_const(&mut self, ty: &LogicalType, value: i64) -> Value {
        let ty = self.lower(ty);
        self.builder.ins().iconst(ty, value)
    }

    /// Floating-point constant of `ty` (`Float32` or `Float64`).
    pub fn float_const(&mut self, ty: &LogicalType, value: f64) -> Value {
        match ty {
            LogicalType::Float32 => self.builder.ins().f32const(value as f32),
            _ => self.builder.ins().f64const(value),
        }
    }

    /// Additive identity of `ty`.
    pub fn zero(&mut self, ty: &LogicalType) -> Value {
        if ty.is_float() { self.float_const(ty, 0.0) } else { self.int_const(ty, 0) }
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    pub fn add(&mut self, ty: &LogicalType, lhs: Value, rhs: Value) -> Value {
        if ty.is_float() { self.builder.ins().fadd(lhs, rhs) } else { self.builder.ins().iadd(lhs, rhs) }
    }

    pub fn mul(&mut self, ty: &LogicalType, lhs: Value, rhs: Value) -> Value {
        if ty.is_float() { self.builder.ins().fmul(lhs, rhs) } else { self.builder.ins().imul(lhs, rhs) }
    }

    /// `a * b + c` on integer index values.
    pub fn mul_add(&mut self, a: Value, b: Value, c: Value) -> Value {
        let product = self.builder.ins().imul(a, b);
        self.builder.ins().iadd(product, c)
    }

    /// Signed integer to float conversion.
    pub fn int_to_float(&mut self, ty: &LogicalType, value: Value) -> Value {
        let ty = self.lower(ty);
        let value = self.resize_int(value, ty.bits(), true);
        self.builder.ins().fcvt_from_sint(ty, value)
    }

    /// Unsigned integer to float conversion.
    pub fn uint_to_float(&mut self, ty: &LogicalType, value: Value) -> Value {
        let ty = self.lower(ty);
        let value = self.resize_int(value, ty.bits(), false);
        self.builder.ins().fcvt_from_uint(ty, value)
    }

    /// Extend or reduce an integer so its width matches the float it converts to.
    fn resize_int(&mut self, value: Value, bits: u32, signed: bool) -> Value {
        let src = self.builder.func.dfg.value_type(value);
        let Some(dst) = Type::int_with_byte_size((bits / 8) as u16) else {
            return value;
        };
        if src.bits() < bits {
            if signed { self.builder.ins().sextend(dst, value) } else { self.builder.ins().uextend(dst, value) }
        } else if src.bits() > bits {
            self.builder.ins().ireduce(dst, value)
        } else {
            value
        }
    }

    /// Float to signed integer, truncating toward zero (saturating on overflow).
    pub fn float_to_int(&mut self, ty: &LogicalType, value: Value) -> Value {
        let ty = self.lower(ty);
        self.builder.ins().fcvt_to_sint_sat(ty, value)
    }

    /// `cond ? if_true : if_false` as a data-dependent select, no branch.
    pub fn select(&mut self, cond: Value, if_true: Value, if_false: Value) -> Value {
        self.builder.ins().select(cond, if_true, if_false)
    }

    /// `value == imm` as a boolean.
    pub fn equals_imm(&mut self, value: Value, imm: i64) -> Value {
        self.builder.ins().icmp_imm(IntCC::Equal, value, imm)
    }

    // ------------------------------------------------------------------
    // Memory
    // ------------------------------------------------------------------

    /// Address of `base[index]` for elements of type `elem`.
    pub fn element_addr(&mut self, elem: &LogicalType, base: Value, index: Value) -> Value {
        let pointer = self.lowering.pointer();
        let index_ty = self.builder.func.dfg.value_type(index);
        let index = if index_ty.bits() < pointer.bits() {
            self.builder.ins().sextend(pointer, index)
        } else if index_ty.bits() > pointer.bits() {
            self.builder.ins().ireduce(pointer, index)
        } else {
            index
        };
        let offset = self.builder.ins().imul_imm(index, i64::from(self.lowering.bytes(elem)));
        self.builder.ins().iadd(base, offset)
    }

    /// Load `base[index]`.
    pub fn load_element(&mut self, elem: &LogicalType, base: Value, index: Value) -> Value {
        let addr = self.element_addr(elem, base, index);
        self.load(elem, addr, 0)
    }

    /// Store `value` to `base[index]`.
    pub fn store_element(&mut self, elem: &LogicalType, base: Value, index: Value, value: Value) {
        let addr = self.element_addr(elem, base, index);
        self.store(value, addr, 0);
    }

    /// Load a value of `ty` at `addr + offset`.
    pub fn load(&mut self, ty: &LogicalType, addr: Value, offset: i32) -> Value {
        let ty = self.lower(ty);
        self.builder.ins().load(ty, MemFlags::new(), addr, offset)
    }

    /// Store `value` at `addr + offset`.
    pub fn store(&mut self, value: Value, addr: Value, offset: i32) {
        self.builder.ins().store(MemFlags::new(), value, addr, offset);
    }

    /// Reserve a stack-local buffer and return its address.
    pub fn stack_alloc(&mut self, size: u32, align_shift: u8) -> Value {
        let slot = self.builder.create_sized_stack_slot(StackSlotData::new(StackSlotKind::ExplicitSlot, size, align_shift));
        let pointer = self.lowering.pointer();
        self.builder.ins().stack_addr(pointer, slot, 0)
    }

    // ------------------------------------------------------------------
    // Locals
    // ------------------------------------------------------------------

    /// Mutable local of type `ty`, initialized to `init`.
    pub fn local(&mut self, ty: &LogicalType, init: Value) -> Variable {
        let ty = self.lower(ty);
        let var = self.builder.declare_var(ty);
        self.builder.def_var(var, init);
        var
    }

    pub fn get_local(&mut self, var: Variable) -> Value {
        self.builder.use_var(var)
    }

    pub fn set_local(&mut self, var: Variable, value: Value) {
        self.builder.def_var(var, value);
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    /// Counted loop `for i in 0..end`.
    ///
    /// The counter has the type of `end` and the bound is compared signed, so
    /// `end <= 0` executes the body zero times.
    ///
    /// ```text
    /// current: jump header
    /// header:  i = counter; brif i < end, body, exit
    /// body:    <body(i)>; counter = i + 1; jump header
    /// exit:    <continuation>
    /// ```
    pub fn for_range<F>(&mut self, end: Value, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self, Value) -> Result<()>,
    {
        let counter_ty = self.builder.func.dfg.value_type(end);
        let counter = self.builder.declare_var(counter_ty);
        let zero = self.builder.ins().iconst(counter_ty, 0);
        self.builder.def_var(counter, zero);

        let header_block = self.builder.create_block();
        let body_block = self.builder.create_block();
        let exit_block = self.builder.create_block();
        let no_args: &[BlockArg] = &[];

        self.builder.ins().jump(header_block, no_args);

        self.builder.switch_to_block(header_block);
        let index = self.builder.use_var(counter);
        let cond = self.builder.ins().icmp(IntCC::SignedLessThan, index, end);
        self.builder.ins().brif(cond, body_block, no_args, exit_block, no_args);

        // Body's only predecessor is the header.
        self.builder.switch_to_block(body_block);
        self.builder.seal_block(body_block);

        body(self, index)?;

        let next = self.builder.ins().iadd_imm(index, 1);
        self.builder.def_var(counter, next);
        self.builder.ins().jump(header_block, no_args);
        self.builder.seal_block(header_block);

        self.builder.switch_to_block(exit_block);
        self.builder.seal_block(exit_block);
        Ok(())
    }

    /// Return from the function.
    pub fn ret(&mut self, values: &[Value]) {
        self.builder.ins().return_(values);
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    /// Call a function of the same module, returning its results.
    pub fn call(&mut self, callee: FuncId, args: &[Value]) -> Vec<Value> {
        let func_ref = self.module.declare_func_in_func(callee, self.builder.func);
        let inst = self.builder.ins().call(func_ref, args);
        self.builder.inst_results(inst).to_vec()
    }

    /// Call a function that returns exactly one value.
    pub fn call_value(&mut self, callee: FuncId, args: &[Value]) -> Result<Value> {
        self.call(callee, args).first().copied().context(NoReturnValueSnafu { callee: callee.to_string() })
    }

    /// Pointer-sized integer type of the target.
    pub fn pointer_type(&self) -> Type {
        self.lowering.pointer()
    }
}
