//! Public dot-product functions.
//!
//! `void <module>_DotProduct{Float,Int}(int count, T* left, T* right, T* result)`
//! computes `sum(left[i] * right[i])` for `i in 0..count` and writes it to
//! `*result`. `*result` is zeroed before accumulation, so `count <= 0` leaves
//! zero there.

use cranelift_module::{FuncId, Linkage, Module};
use ember_dtype::LogicalType;

use super::RuntimeProvider;
use crate::error::Result;
use crate::types::FunctionSignature;

const DOT_PRODUCT_FLOAT: &str = "DotProductFloat";
const DOT_PRODUCT_INT: &str = "DotProductInt";

impl<M: Module> RuntimeProvider<'_, M> {
    /// `<module>_DotProductFloat` over `f64` vectors.
    pub fn dot_product_float_function(&mut self) -> Result<FuncId> {
        self.dot_product_function(DOT_PRODUCT_FLOAT, LogicalType::Float64)
    }

    /// `<module>_DotProductInt` over `i32` vectors.
    pub fn dot_product_int_function(&mut self) -> Result<FuncId> {
        self.dot_product_function(DOT_PRODUCT_INT, LogicalType::Int32)
    }

    fn dot_product_function(&mut self, operation: &str, elem: LogicalType) -> Result<FuncId> {
        let array = || elem.clone().ptr();
        let sig = FunctionSignature::void(vec![LogicalType::Int32, array(), array(), array()]);
        let key = self.namespaced(operation);

        self.get_or_materialize(key, |emitter, name| {
            emitter.define_function(name, &sig, Linkage::Export, |fe| {
                let count = fe.param(0);
                let left = fe.param(1);
                let right = fe.param(2);
                let result = fe.param(3);

                let zero = fe.zero(&elem);
                fe.store(zero, result, 0);
                let sum = fe.local(&elem, zero);

                fe.for_range(count, |fe, i| {
                    let l = fe.load_element(&elem, left, i);
                    let r = fe.load_element(&elem, right, i);
                    let product = fe.mul(&elem, l, r);
                    let acc = fe.get_local(sum);
                    let acc = fe.add(&elem, acc, product);
                    fe.set_local(sum, acc);
                    Ok(())
                })?;

                let total = fe.get_local(sum);
                fe.store(total, result, 0);
                fe.ret(&[]);
                Ok(())
            })
        })
    }
}
