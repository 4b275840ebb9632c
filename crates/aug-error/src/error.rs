// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`AugmentedError`] type and its construction contract.

use std::borrow::Cow;
use std::fmt;

use aug_trace::CallTrace;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::cause::Cause;
use crate::details::Details;
use crate::options::StackOptions;

/// Function-path fragments of everything that constructs an [`AugmentedError`].
///
/// Leading frames matching these are cut from the captured call site.
const CONSTRUCTOR_FRAMES: &[&str] = &[
    "aug_error::error::AugmentedError",
    "aug_error::error::ErrorConfig",
    "aug_error::create",
];

// ---------------------------------------------------------------------------
// ErrorConfig
// ---------------------------------------------------------------------------

/// Everything an [`AugmentedError`] can be constructed from.
///
/// Every field is optional. Use the builder methods or a struct literal with
/// `..Default::default()`.
#[derive(Debug, Default)]
pub struct ErrorConfig {
    /// Diagnostic payload, stored verbatim.
    pub details: Option<Details>,
    /// The wrapped error or value.
    pub error: Option<Cause>,
    /// Explicit message; overrides the cause's message.
    pub message: Option<String>,
    /// Explicit name; overrides the cause's name.
    pub name: Option<String>,
    /// Capture and stack-assembly settings.
    pub options: StackOptions,
}

impl ErrorConfig {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a diagnostic payload.
    #[must_use]
    pub fn details<T>(mut self, details: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        self.details = Some(Details::new(details));
        self
    }

    /// Wrap an error or value.
    #[must_use]
    pub fn error(mut self, error: impl Into<Cause>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Set an explicit message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set an explicit name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override capture and stack-assembly settings.
    #[must_use]
    pub fn options(mut self, options: StackOptions) -> Self {
        self.options = options;
        self
    }

    /// Construct the error, capturing the caller's stack.
    #[inline(never)]
    pub fn build(self) -> AugmentedError {
        AugmentedError::new(self)
    }
}

// ---------------------------------------------------------------------------
// AugmentedError
// ---------------------------------------------------------------------------

/// An error with a name, a message, structured details, a cause, and a lazily
/// assembled stack trace.
///
/// Everything is fixed at construction. The fields are private and there are
/// no setters, so nothing can be reassigned afterwards:
///
/// ```compile_fail
/// let mut err = aug_error::AugmentedError::default();
/// err.name = Some("Renamed".to_owned());
/// ```
///
/// ```compile_fail
/// let mut err = aug_error::AugmentedError::default();
/// err.message = Some("changed".to_owned());
/// ```
///
/// ```compile_fail
/// let mut err = aug_error::AugmentedError::default();
/// err.details = None;
/// ```
///
/// ```compile_fail
/// let mut err = aug_error::AugmentedError::default();
/// err.error = Some(aug_error::Cause::from("other"));
/// ```
///
/// The only state that changes after construction is the stack cache, which
/// is filled once on first read.
pub struct AugmentedError {
    name: Option<String>,
    message: Option<String>,
    details: Option<Details>,
    error: Option<Cause>,
    pub(crate) options: StackOptions,
    pub(crate) trace: CallTrace,
    pub(crate) stack: OnceCell<String>,
}

impl AugmentedError {
    /// Construct an error from `config`, capturing the caller's stack.
    #[inline(never)]
    pub fn new(config: ErrorConfig) -> Self {
        let ErrorConfig {
            details,
            error,
            message,
            name,
            options,
        } = config;
        Self {
            trace: CallTrace::capture(options.capture, CONSTRUCTOR_FRAMES),
            name,
            message,
            details,
            error,
            options,
            stack: OnceCell::new(),
        }
    }

    /// Start a configuration.
    #[must_use]
    pub fn builder() -> ErrorConfig {
        ErrorConfig::new()
    }

    /// The explicit name, or else the cause's name.
    pub fn name(&self) -> Option<&str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Some(name),
            _ => self.error.as_ref().and_then(Cause::name),
        }
    }

    /// The explicit message, or else the cause's message.
    pub fn message(&self) -> Option<Cow<'_, str>> {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => Some(Cow::Borrowed(message)),
            _ => self.error.as_ref().and_then(Cause::message),
        }
    }

    /// The payload exactly as given at construction.
    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    /// The wrapped error or value.
    pub fn error(&self) -> Option<&Cause> {
        self.error.as_ref()
    }

    /// Alias of [`error`](Self::error).
    pub fn cause(&self) -> Option<&Cause> {
        self.error()
    }

    /// Settings this error was built with.
    pub fn options(&self) -> StackOptions {
        self.options
    }
}

impl Default for AugmentedError {
    fn default() -> Self {
        Self::new(ErrorConfig::default())
    }
}

impl From<ErrorConfig> for AugmentedError {
    fn from(config: ErrorConfig) -> Self {
        Self::new(config)
    }
}

impl fmt::Display for AugmentedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("Error"))?;
        if let Some(message) = self.message() {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AugmentedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AugmentedError");
        d.field("name", &self.name());
        d.field("message", &self.message());
        if let Some(details) = &self.details {
            d.field("details", details);
        }
        if let Some(cause) = &self.error {
            d.field("cause", cause);
        }
        d.finish_non_exhaustive()
    }
}

impl std::error::Error for AugmentedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.as_ref().and_then(Cause::as_error)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
