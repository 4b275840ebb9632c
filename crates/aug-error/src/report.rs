// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable snapshot of an [`AugmentedError`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cause::Cause;
use crate::details::Details;
use crate::error::{AugmentedError, ErrorConfig};
use crate::stack::StackError;

/// Everything an [`AugmentedError`] shows, flattened for transport or storage.
///
/// The cause is kept as its string form only; converting a report back into
/// an error yields a [`Cause::Value`] and a fresh call-site capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorReport {
    /// Effective name (explicit or inherited).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Effective message (explicit or inherited).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Details as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// The assembled stack.
    pub stack: String,
    /// Display text of the cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl AugmentedError {
    /// Take a serializable snapshot of this error.
    ///
    /// Assembles (and caches) the stack if it has not been read yet.
    pub fn report(&self) -> Result<ErrorReport, StackError> {
        ErrorReport::try_from(self)
    }
}

impl TryFrom<&AugmentedError> for ErrorReport {
    type Error = StackError;

    fn try_from(err: &AugmentedError) -> Result<Self, Self::Error> {
        Ok(Self {
            name: err.name().map(str::to_owned),
            message: err.message().map(|message| message.into_owned()),
            details: err.details().map(Details::to_json).transpose()?,
            stack: err.stack()?.to_owned(),
            cause: err.error().map(Cause::to_string),
        })
    }
}

impl From<ErrorReport> for AugmentedError {
    fn from(report: ErrorReport) -> Self {
        Self::new(ErrorConfig {
            details: report.details.map(Details::new),
            error: report.cause.map(Cause::Value),
            message: report.message,
            name: report.name,
            ..ErrorConfig::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
