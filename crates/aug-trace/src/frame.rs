// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call-site entries and their one-line text rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure raised while rendering a [`CallSite`].
///
/// Only its `Display` output is ever used, and that output may itself fail.
pub type RenderFailure = Box<dyn fmt::Display + Send + Sync>;

/// A single entry of a structured stack trace.
pub trait CallSite {
    /// Render the entry to one line of text.
    fn render(&self) -> Result<String, RenderFailure>;
}

impl CallSite for str {
    fn render(&self) -> Result<String, RenderFailure> {
        Ok(self.to_owned())
    }
}

impl CallSite for String {
    fn render(&self) -> Result<String, RenderFailure> {
        self.as_str().render()
    }
}

impl<T: CallSite + ?Sized> CallSite for &T {
    fn render(&self) -> Result<String, RenderFailure> {
        (**self).render()
    }
}

impl<T: CallSite> CallSite for Option<T> {
    fn render(&self) -> Result<String, RenderFailure> {
        match self {
            Some(site) => site.render(),
            None => Err(Box::new("call site is missing")),
        }
    }
}

// ---------------------------------------------------------------------------
// StackFrame
// ---------------------------------------------------------------------------

/// One resolved (or partially resolved) frame of a captured call stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    /// Demangled function name, without the trailing hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Source file the frame points into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// 1-based line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Instruction pointer, when the frame came from the unwinder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<usize>,
}

impl StackFrame {
    /// Frame for a named function with no location.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: Some(function.into()),
            ..Self::default()
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: Option<u32>, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self.column = column;
        self
    }

    /// `file[:line[:column]]`, if the file is known.
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        let mut location = file.to_owned();
        if let Some(line) = self.line {
            location.push_str(&format!(":{line}"));
            if let Some(column) = self.column {
                location.push_str(&format!(":{column}"));
            }
        }
        Some(location)
    }
}

impl CallSite for StackFrame {
    fn render(&self) -> Result<String, RenderFailure> {
        match (self.function.as_deref(), self.location()) {
            (Some(function), Some(location)) => Ok(format!("{function} ({location})")),
            (Some(function), None) => Ok(function.to_owned()),
            (None, Some(location)) => Ok(format!("<anonymous> ({location})")),
            (None, None) => match self.address {
                Some(address) => Ok(format!("{address:#x}")),
                None => Err(Box::new("unresolved call site")),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
