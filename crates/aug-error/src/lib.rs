// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors with structured details, cause chaining, and lazily assembled stack
//! traces.
//!
//! An [`AugmentedError`] carries an optional name and message, an arbitrary
//! serialisable [`Details`] payload, and an optional [`Cause`]. When it has no
//! name or message of its own it inherits them from the cause. Its
//! [`stack`](AugmentedError::stack) merges the error's own call-site trace with
//! the trace of whatever it wraps. The stack is built on first read and cached.
//!
//! ```
//! use aug_error::{AugmentedError, ErrorConfig};
//!
//! let inner = AugmentedError::new(ErrorConfig::new().name("IoFailure").message("disk full"));
//! let outer = ErrorConfig::new()
//!     .details(serde_json::json!({ "path": "/var/data" }))
//!     .error(inner)
//!     .build();
//!
//! assert_eq!(outer.to_string(), "IoFailure: disk full");
//! let stack = outer.stack().unwrap();
//! assert!(stack.starts_with("IoFailure: disk full\nDetails: {\n    \"path\": \"/var/data\"\n}"));
//! assert!(stack.contains("\n-> IoFailure: disk full"));
//! ```
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cause;
mod details;
mod error;
mod options;
mod report;
mod stack;

pub use aug_trace::{CallSite, CaptureStrategy, RenderFailure, StackFrame, prepare_stack_trace};
pub use cause::{Cause, NativeError};
pub use details::Details;
pub use error::{AugmentedError, ErrorConfig};
pub use options::{ChainPolicy, DEFAULT_CHAIN_DEPTH, MAX_CHAIN_DEPTH, OptionsError, StackOptions};
pub use report::ErrorReport;
pub use stack::StackError;

/// Build an [`AugmentedError`] from `config`.
///
/// Equivalent to [`AugmentedError::new`]; provided for call sites that read
/// better as a plain factory call.
#[inline(never)]
pub fn create(config: ErrorConfig) -> AugmentedError {
    AugmentedError::new(config)
}
