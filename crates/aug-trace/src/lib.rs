// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call-site capture and stack-trace formatting.
//!
//! This crate provides the low-level pieces that augmented errors build their
//! `stack` string from:
//!
//! * [`CallTrace`]: an opaque capture of the call site, taken either with the
//!   unresolved `backtrace` unwinder or by harvesting a throwaway
//!   [`std::backtrace::Backtrace`] ([`CaptureStrategy`]).
//! * [`CallSite`] and [`StackFrame`]: entries of a structured trace that can
//!   render themselves to a single line.
//! * [`prepare_stack_trace`]: the formatting hook that turns a sequence of call
//!   sites into `"    at <frame>"` lines, never failing.
//! * [`FormatterGuard`]: a scoped swap of the per-thread trace formatter used by
//!   [`CallTrace::render`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod capture;
mod format;
mod frame;

pub use capture::{CallTrace, CaptureStrategy, parse_std_backtrace};
pub use format::{
    FormatterGuard, TraceFormatter, current_formatter, default_formatter, prepare_stack_trace,
};
pub use frame::{CallSite, RenderFailure, StackFrame};
