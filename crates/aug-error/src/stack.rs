// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy stack assembly.

use std::collections::HashSet;
use std::sync::Arc;

use aug_trace::{FormatterGuard, StackFrame, prepare_stack_trace};
use tracing::{debug, trace};

use crate::cause::Cause;
use crate::error::AugmentedError;
use crate::options::ChainPolicy;

const DETAILS_PREFIX: &str = "\nDetails: ";
const CAUSE_PREFIX: &str = "\n-> ";

/// Why a stack could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// The details payload failed to serialise.
    #[error("failed to serialize error details: {0}")]
    Details(#[from] serde_json::Error),

    /// The stack of a wrapped error failed to assemble.
    #[error("failed to assemble the stack of a wrapped error")]
    Cause(#[source] Box<StackError>),
}

impl StackError {
    pub(crate) fn nested(inner: StackError) -> Self {
        Self::Cause(Box::new(inner))
    }
}

impl AugmentedError {
    /// The full stack: header, details, call site, then the cause chain.
    ///
    /// Assembled on first call and cached; every later call returns the same
    /// string. A failure is not cached, so the next call tries again.
    ///
    /// ```
    /// use aug_error::ErrorConfig;
    ///
    /// let err = ErrorConfig::new()
    ///     .message("upload failed")
    ///     .error("connection reset")
    ///     .build();
    /// let stack = err.stack().unwrap();
    /// assert!(stack.starts_with("Error: upload failed\n"));
    /// assert!(stack.ends_with("\n-> connection reset"));
    /// assert!(std::ptr::eq(stack, err.stack().unwrap()));
    /// ```
    pub fn stack(&self) -> Result<&str, StackError> {
        self.stack
            .get_or_try_init(|| self.assemble())
            .map(String::as_str)
    }

    /// Format a raw structured trace as `"    at <frame>"` lines.
    ///
    /// Same as [`aug_trace::prepare_stack_trace`].
    pub fn prepare_stack_trace<C: aug_trace::CallSite>(
        context: &dyn std::any::Any,
        call_sites: &[C],
    ) -> String {
        prepare_stack_trace(context, call_sites)
    }

    fn assemble(&self) -> Result<String, StackError> {
        let mut stack = self.segment()?;
        match self.options.chain {
            ChainPolicy::SingleHop => {
                if let Some(cause) = self.error() {
                    stack.push_str(CAUSE_PREFIX);
                    stack.push_str(&cause.trace()?);
                }
            }
            ChainPolicy::FollowAugmented { max_depth } => {
                self.follow_chain(&mut stack, max_depth)?;
            }
        }
        trace!(target: "aug.error", error = %self, len = stack.len(), "assembled stack");
        Ok(stack)
    }

    /// Header, details, and the formatted call site; no cause.
    fn segment(&self) -> Result<String, StackError> {
        let mut segment = self.to_string();
        if let Some(details) = self.details() {
            segment.push_str(DETAILS_PREFIX);
            segment.push_str(&details.to_pretty_json()?);
        }
        let frames = {
            let _guard = FormatterGuard::install(prepare_stack_trace::<StackFrame>);
            self.trace.render()
        };
        push_frames(&mut segment, &frames);
        Ok(segment)
    }

    fn follow_chain(&self, stack: &mut String, max_depth: usize) -> Result<(), StackError> {
        let mut visited: HashSet<*const AugmentedError> = HashSet::new();
        visited.insert(self);
        let mut depth = 0;
        let mut current = self.error();
        while let Some(cause) = current {
            stack.push_str(CAUSE_PREFIX);
            let Cause::Augmented(inner) = cause else {
                stack.push_str(&cause.trace()?);
                break;
            };
            depth += 1;
            if depth > max_depth || !visited.insert(Arc::as_ptr(inner)) {
                debug!(target: "aug.error", depth, max_depth, "cause chain walk cut short");
                stack.push_str(&inner.to_string());
                break;
            }
            stack.push_str(&inner.segment().map_err(StackError::nested)?);
            current = inner.error();
        }
        Ok(())
    }
}

fn push_frames(segment: &mut String, frames: &str) {
    if !frames.is_empty() {
        segment.push('\n');
        segment.push_str(frames);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
