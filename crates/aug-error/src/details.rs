// SPDX-License-Identifier: MIT OR Apache-2.0
//! Type-erased diagnostic payloads.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;

trait Payload: Any + fmt::Debug + Send + Sync {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
    fn write_pretty(&self, out: &mut Vec<u8>) -> Result<(), serde_json::Error>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> Payload for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn write_pretty(&self, out: &mut Vec<u8>) -> Result<(), serde_json::Error> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(out, formatter);
        self.serialize(&mut serializer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Arbitrary structured payload attached to an error.
///
/// The original value is kept as-is and can be recovered with
/// [`downcast_ref`](Self::downcast_ref). Serialisation only happens when the
/// payload is rendered, so a value that cannot be serialised is accepted here
/// and reported later by [`AugmentedError::stack`](crate::AugmentedError::stack).
pub struct Details(Box<dyn Payload>);

impl Details {
    /// Wrap a value.
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Self(Box::new(value))
    }

    /// Borrow the stored value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// Whether the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Convert the payload to a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        self.0.to_json()
    }

    /// Serialise the payload as JSON indented by four spaces.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::with_capacity(128);
        self.0.write_pretty(&mut out)?;
        String::from_utf8(out).map_err(serde_json::Error::custom)
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Details").field(&self.0).finish()
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}
