//! Target-device description.
//!
//! A [`TargetDescriptor`] is supplied once per module and never mutated. It
//! carries the properties that change which code a runtime-function request
//! resolves to: the OS family (timing strategy) and the native integer width.

pub mod target;
pub mod timespec;


pub use target::{NativeIntWidth, OsFamily, TargetDescriptor};
pub use timespec::TimespecLayout;
