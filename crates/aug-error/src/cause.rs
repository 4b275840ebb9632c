// SPDX-License-Identifier: MIT OR Apache-2.0
//! The value an [`AugmentedError`] wraps.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::error::AugmentedError;
use crate::options::MAX_CHAIN_DEPTH;
use crate::stack::StackError;

/// What an [`AugmentedError`] wraps.
///
/// Causes are shared by reference: cloning a `Cause` never copies the
/// underlying error.
#[derive(Clone)]
pub enum Cause {
    /// Another augmented error.
    Augmented(Arc<AugmentedError>),
    /// Any other `std::error::Error`.
    Native(NativeError),
    /// A value that is not an error, kept as its string representation.
    Value(String),
}

impl Cause {
    /// Wrap a native error.
    ///
    /// A boxed [`AugmentedError`] is recognised and becomes
    /// [`Cause::Augmented`].
    pub fn native(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        match error.into().downcast::<AugmentedError>() {
            Ok(augmented) => Self::Augmented(Arc::from(augmented)),
            Err(other) => Self::Native(NativeError::from_boxed(other, None)),
        }
    }

    /// Wrap a non-error value by its `Display` output.
    pub fn value(value: impl fmt::Display) -> Self {
        Self::Value(value.to_string())
    }

    /// Name exposed by the wrapped error, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Augmented(error) => error.name(),
            Self::Native(error) => error.name(),
            Self::Value(_) => None,
        }
    }

    /// Message exposed by the wrapped error, if any.
    pub fn message(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Augmented(error) => error.message(),
            Self::Native(error) => error.message().map(Cow::Owned),
            Self::Value(_) => None,
        }
    }

    /// Whether the cause carries its own trace.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    /// The wrapped augmented error, if that is what this is.
    pub fn as_augmented(&self) -> Option<&Arc<AugmentedError>> {
        match self {
            Self::Augmented(error) => Some(error),
            _ => None,
        }
    }

    /// The wrapped value as a `std::error::Error`, unless it is a plain value.
    pub fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Augmented(error) => Some(error.as_ref()),
            Self::Native(error) => Some(error.get_ref()),
            Self::Value(_) => None,
        }
    }

    /// Text appended after `-> ` when this cause is unwound into a stack.
    pub(crate) fn trace(&self) -> Result<Cow<'_, str>, StackError> {
        match self {
            Self::Augmented(error) => error
                .stack()
                .map(Cow::Borrowed)
                .map_err(StackError::nested),
            Self::Native(error) => Ok(Cow::Owned(error.stack())),
            Self::Value(value) => Ok(Cow::Borrowed(value)),
        }
    }
}

impl From<AugmentedError> for Cause {
    fn from(error: AugmentedError) -> Self {
        Self::Augmented(Arc::new(error))
    }
}

impl From<Arc<AugmentedError>> for Cause {
    fn from(error: Arc<AugmentedError>) -> Self {
        Self::Augmented(error)
    }
}

impl From<NativeError> for Cause {
    fn from(error: NativeError) -> Self {
        Self::Native(error)
    }
}

impl From<&str> for Cause {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}

impl From<String> for Cause {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Augmented(error) => fmt::Display::fmt(error, f),
            Self::Native(error) => fmt::Display::fmt(error, f),
            Self::Value(value) => f.write_str(value),
        }
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Augmented(error) => f.debug_tuple("Augmented").field(error).finish(),
            Self::Native(error) => f.debug_tuple("Native").field(error).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// NativeError
// ---------------------------------------------------------------------------

/// A plain `std::error::Error` used as a cause, with an optional name.
///
/// Native errors have no call-site trace of their own. Their stack is their
/// header (`name: message`) followed by one `-> ` line per
/// [`source`](StdError::source) in their chain.
#[derive(Clone)]
pub struct NativeError {
    name: Option<String>,
    inner: Arc<dyn StdError + Send + Sync>,
}

impl NativeError {
    /// Wrap an error without a name.
    pub fn new(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::from_boxed(error.into(), None)
    }

    /// Wrap an error and give it a name.
    pub fn named(
        name: impl Into<String>,
        error: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::from_boxed(error.into(), Some(name.into()))
    }

    fn from_boxed(error: Box<dyn StdError + Send + Sync>, name: Option<String>) -> Self {
        Self {
            name,
            inner: Arc::from(error),
        }
    }

    /// The name given at wrap time, unless it was empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// The error's `Display` output, unless it is empty.
    pub fn message(&self) -> Option<String> {
        Some(self.inner.to_string()).filter(|message| !message.is_empty())
    }

    /// Borrow the wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// `name: message`, then the `source()` chain.
    pub fn stack(&self) -> String {
        let mut stack = self.to_string();
        let sources = std::iter::successors(self.inner.source(), |&error| error.source());
        for source in sources.take(MAX_CHAIN_DEPTH) {
            stack.push_str("\n-> ");
            stack.push_str(&source.to_string());
        }
        stack
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("Error"))?;
        if let Some(message) = self.message() {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("NativeError");
        if let Some(name) = &self.name {
            d.field("name", name);
        }
        d.field("inner", &self.inner);
        d.finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorConfig;
    use std::io;

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("could not load settings")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn native_message_is_display_text() {
        let cause = Cause::native(io::Error::other("disk full"));
        assert_eq!(cause.message().as_deref(), Some("disk full"));
        assert_eq!(cause.name(), None);
        assert!(cause.is_error());
    }

    #[test]
    fn named_native_error() {
        let cause: Cause = NativeError::named("IoError", io::Error::other("denied")).into();
        assert_eq!(cause.name(), Some("IoError"));
        assert_eq!(cause.to_string(), "IoError: denied");
    }

    #[test]
    fn empty_native_message_is_absent() {
        let native = NativeError::new(io::Error::other(""));
        assert_eq!(native.message(), None);
        assert_eq!(native.to_string(), "Error");
    }

    #[test]
    fn native_stack_follows_sources() {
        let native = NativeError::named(
            "ConfigError",
            Wrapper(io::Error::new(io::ErrorKind::NotFound, "settings.toml missing")),
        );
        assert_eq!(
            native.stack(),
            "ConfigError: could not load settings\n-> settings.toml missing"
        );
    }

    #[derive(Debug)]
    struct Layer(&'static str, Box<dyn StdError + Send + Sync>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self.1.as_ref())
        }
    }

    #[test]
    fn native_stack_follows_nested_sources() {
        let root = io::Error::other("connection refused");
        let middle = Layer("handshake failed", Box::new(root));
        let native = NativeError::new(Layer("sync aborted", Box::new(middle)));
        assert_eq!(
            native.stack(),
            "Error: sync aborted\n-> handshake failed\n-> connection refused"
        );
    }

    #[test]
    fn boxed_augmented_error_is_recognised() {
        let boxed: Box<dyn StdError + Send + Sync> =
            Box::new(ErrorConfig::new().name("Inner").build());
        let cause = Cause::native(boxed);
        let inner = cause.as_augmented().expect("augmented cause");
        assert_eq!(inner.name(), Some("Inner"));
    }

    #[test]
    fn plain_values_are_not_errors() {
        let cause = Cause::from("inner error string");
        assert!(!cause.is_error());
        assert!(cause.as_error().is_none());
        assert_eq!(cause.name(), None);
        assert_eq!(cause.message(), None);
        assert_eq!(cause.trace().unwrap(), "inner error string");
        assert_eq!(Cause::value(404).to_string(), "404");
    }

    #[test]
    fn clones_share_the_error() {
        let cause = Cause::from(ErrorConfig::new().build());
        let copy = cause.clone();
        assert!(Arc::ptr_eq(
            cause.as_augmented().unwrap(),
            copy.as_augmented().unwrap()
        ));
    }

    #[test]
    fn as_error_exposes_native() {
        let cause = Cause::native(io::Error::other("x"));
        assert_eq!(cause.as_error().unwrap().to_string(), "x");
    }
}
