//! Wall-clock timing for instrumented inference code.
//!
//! Generated code reads time through `clock_gettime`. POSIX targets link the
//! C library's function; Windows targets have no such function, so an
//! implementation with the same signature is synthesized on top of the Win32
//! performance counter:
//!
//! ```text
//! int clock_gettime(int clk_id, struct timespec *tp) {
//!     int64_t counter, frequency;
//!     QueryPerformanceCounter(&counter);
//!     QueryPerformanceFrequency(&frequency);
//!     double seconds = (double)counter / (double)frequency;
//!     double whole = (double)(int64_t)seconds;
//!     tp->tv_nsec = (seconds - whole) * 10000000;   // 100ns ticks
//!     tp->tv_sec = whole;
//!     return 0;
//! }
//! ```
//!
//! `<module>_GetTime() -> double` is then built once on top of whichever
//! `clock_gettime` resulted and returns milliseconds.

use cranelift_codegen::ir::{InstBuilder, Value};
use cranelift_module::{FuncId, Linkage, Module};
use ember_device::TargetDescriptor;
use ember_dtype::LogicalType;
use snafu::ResultExt;
use tracing::debug;

use super::RuntimeProvider;
use crate::emitter::FunctionEmitter;
use crate::error::{FunctionResolutionSnafu, Result};
use crate::symbols::FunctionKey;
use crate::types::FunctionSignature;

/// Clock id passed to `clock_gettime` by `GetTime`.
pub const CLOCK_REALTIME: i64 = 0;

const CLOCK_GETTIME: &str = "clock_gettime";
const QUERY_PERFORMANCE_COUNTER: &str = "QueryPerformanceCounter";
const QUERY_PERFORMANCE_FREQUENCY: &str = "QueryPerformanceFrequency";
const GET_TIME: &str = "GetTime";

/// Scale of the sub-second field written by the performance-counter clock.
const TICKS_PER_SECOND: f64 = 10_000_000.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
const MILLIS_PER_SECOND: f64 = 1_000.0;

/// How `clock_gettime` is obtained. Chosen once per provider from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Declare the C library's `clock_gettime`.
    Posix,
    /// Synthesize `clock_gettime` over `QueryPerformanceCounter`/`QueryPerformanceFrequency`.
    PerformanceCounter,
}

impl ClockSource {
    pub fn for_target(target: &TargetDescriptor) -> Self {
        if target.is_windows() { Self::PerformanceCounter } else { Self::Posix }
    }
}

impl<M: Module> RuntimeProvider<'_, M> {
    pub fn clock_source(&self) -> ClockSource {
        self.clock
    }

    /// `int clock_gettime(int clk_id, struct timespec *tp)`, declared or synthesized.
    pub fn clock_gettime_function(&mut self) -> Result<FuncId> {
        let field = self.emitter.timespec_layout().field().clone();
        let sig = FunctionSignature::returning(vec![LogicalType::Int32, field.ptr()], LogicalType::Int32);

        match self.clock {
            ClockSource::Posix => self.declare_external(CLOCK_GETTIME, sig),
            ClockSource::PerformanceCounter => {
                let counter_sig = FunctionSignature::returning(vec![LogicalType::Int64.ptr()], LogicalType::Int32);
                let query_counter = self.declare_external(QUERY_PERFORMANCE_COUNTER, counter_sig.clone())?;
                let query_frequency = self.declare_external(QUERY_PERFORMANCE_FREQUENCY, counter_sig)?;
                let layout = self.emitter.timespec_layout().clone();

                self.get_or_materialize(FunctionKey::global(CLOCK_GETTIME), |emitter, name| {
                    emitter.define_function(name, &sig, Linkage::Local, |fe| {
                        let tp = fe.param(1);

                        let counter = fe.stack_alloc(8, 3);
                        let frequency = fe.stack_alloc(8, 3);
                        fe.call(query_counter, &[counter]);
                        fe.call(query_frequency, &[frequency]);

                        let counter = fe.load(&LogicalType::Int64, counter, 0);
                        let frequency = fe.load(&LogicalType::Int64, frequency, 0);
                        let counter = fe.int_to_float(&LogicalType::Float64, counter);
                        let frequency = fe.int_to_float(&LogicalType::Float64, frequency);
                        let seconds = fe.ins().fdiv(counter, frequency);

                        let whole = fe.float_to_int(&LogicalType::Int64, seconds);
                        let whole = fe.int_to_float(&LogicalType::Float64, whole);
                        let remainder = fe.ins().fsub(seconds, whole);
                        let scale = fe.float_const(&LogicalType::Float64, TICKS_PER_SECOND);
                        let ticks = fe.mul(&LogicalType::Float64, remainder, scale);

                        let tv_nsec = fe.float_to_int(layout.field(), ticks);
                        fe.store(tv_nsec, tp, layout.nanos_offset());
                        let tv_sec = fe.float_to_int(layout.field(), whole);
                        fe.store(tv_sec, tp, layout.seconds_offset());

                        let ok = fe.int_const(&LogicalType::Int32, 0);
                        fe.ret(&[ok]);
                        Ok(())
                    })
                })
            }
        }
    }

    /// `double <module>_GetTime()`: current time in milliseconds.
    ///
    /// Built once per provider. Fails with `FunctionResolution` when no
    /// `clock_gettime` can be declared or synthesized.
    pub fn current_time_function(&mut self) -> Result<FuncId> {
        if let Some(id) = self.current_time {
            return Ok(id);
        }

        let clock = self.clock_gettime_function().context(FunctionResolutionSnafu { name: CLOCK_GETTIME })?;
        let layout = self.emitter.timespec_layout().clone();
        let sig = FunctionSignature::returning(vec![], LogicalType::Float64);
        let key = self.namespaced(GET_TIME);

        let id = self.get_or_materialize(key, |emitter, name| {
            emitter.define_function(name, &sig, Linkage::Export, |fe| {
                let f64_ty = LogicalType::Float64;
                let tp = fe.stack_alloc(layout.size(), layout.align_shift());
                let clock_id = fe.int_const(&LogicalType::Int32, CLOCK_REALTIME);
                fe.call(clock, &[clock_id, tp]);

                let seconds = fe.load(layout.field(), tp, layout.seconds_offset());
                let nanos = fe.load(layout.field(), tp, layout.nanos_offset());
                let seconds = fe.int_to_float(&f64_ty, seconds);
                let nanos = fe.uint_to_float(&f64_ty, nanos);

                let per_second = fe.float_const(&f64_ty, NANOS_PER_SECOND);
                let fraction = fe.ins().fdiv(nanos, per_second);
                let total = fe.add(&f64_ty, seconds, fraction);
                let scale = fe.float_const(&f64_ty, MILLIS_PER_SECOND);
                let millis = fe.mul(&f64_ty, total, scale);
                fe.ret(&[millis]);
                Ok(())
            })
        })?;

        debug!(function = %id, clock = ?self.clock, "current time function ready");
        self.current_time = Some(id);
        Ok(id)
    }
}

/// Emit a call to `get_time` (from [`RuntimeProvider::current_time_function`])
/// in the function under construction. Returns the time in milliseconds.
pub fn emit_current_time<M: Module>(fe: &mut FunctionEmitter<'_, M>, get_time: FuncId) -> Result<Value> {
    fe.call_value(get_time, &[])
}
