// SPDX-License-Identifier: MIT OR Apache-2.0
//! The stack-trace formatting hook and the per-thread formatter slot.

use std::any::Any;
use std::cell::Cell;
use std::fmt::Write as _;
use std::marker::PhantomData;

use crate::frame::{CallSite, StackFrame};

/// Signature of a trace formatter: `(context, frames) -> text`.
pub type TraceFormatter = fn(&dyn Any, &[StackFrame]) -> String;

thread_local! {
    static FORMATTER: Cell<TraceFormatter> = const { Cell::new(default_formatter as TraceFormatter) };
}

/// Render a structured trace as `"    at <frame>"` lines joined by `\n`.
///
/// The `context` argument is accepted for signature compatibility with
/// [`TraceFormatter`] and is ignored.
///
/// Rendering never fails. An entry whose [`CallSite::render`] fails is
/// replaced by `<error: {failure}>`. If printing the failure fails too, the
/// entry becomes `<error>`. Neighbouring entries are unaffected either way.
///
/// ```
/// use aug_trace::prepare_stack_trace;
///
/// let text = prepare_stack_trace(&(), &["line 0", "line 1", "line 2"]);
/// assert_eq!(text, "    at line 0\n    at line 1\n    at line 2");
/// ```
pub fn prepare_stack_trace<C: CallSite>(_context: &dyn Any, call_sites: &[C]) -> String {
    call_sites
        .iter()
        .map(|site| format!("    at {}", render_line(site)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line<C: CallSite + ?Sized>(site: &C) -> String {
    match site.render() {
        Ok(line) => line,
        Err(failure) => {
            let mut line = String::new();
            match write!(line, "<error: {failure}>") {
                Ok(()) => line,
                Err(_) => "<error>".to_owned(),
            }
        }
    }
}

/// Formatter installed on every thread until something swaps it out.
///
/// Prints a numbered listing in the style of `std::backtrace`.
pub fn default_formatter(_context: &dyn Any, frames: &[StackFrame]) -> String {
    frames
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let function = frame.function.as_deref().unwrap_or("<unknown>");
            match frame.location() {
                Some(location) => format!("{index:>4}: {function}\n             at {location}"),
                None => format!("{index:>4}: {function}"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The formatter currently installed on this thread.
pub fn current_formatter() -> TraceFormatter {
    FORMATTER.with(Cell::get)
}

// ---------------------------------------------------------------------------
// FormatterGuard
// ---------------------------------------------------------------------------

/// Scoped installation of a [`TraceFormatter`] on the current thread.
///
/// The previous formatter is saved on [`install`](Self::install) and put back
/// when the guard drops, including during unwinding. Guards must be dropped in
/// reverse order of installation.
///
/// ```
/// use aug_trace::{FormatterGuard, StackFrame, current_formatter, prepare_stack_trace};
///
/// let frames = [StackFrame::new("main")];
/// {
///     let _guard = FormatterGuard::install(prepare_stack_trace::<StackFrame>);
///     assert_eq!(current_formatter()(&(), &frames), "    at main");
/// }
/// assert_eq!(current_formatter()(&(), &frames), "   0: main");
/// ```
#[must_use = "the previous formatter is restored as soon as the guard is dropped"]
pub struct FormatterGuard {
    previous: TraceFormatter,
    // The slot is thread-local; the guard must be dropped where it was made.
    _not_send: PhantomData<*const ()>,
}

impl FormatterGuard {
    /// Install `formatter`, remembering whatever was there before.
    pub fn install(formatter: TraceFormatter) -> Self {
        let previous = FORMATTER.with(|slot| slot.replace(formatter));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }

    /// The formatter that will be restored on drop.
    pub fn previous(&self) -> TraceFormatter {
        self.previous
    }
}

impl Drop for FormatterGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        // The slot may already be gone during thread teardown.
        let _ = FORMATTER.try_with(|slot| slot.set(previous));
    }
}

impl std::fmt::Debug for FormatterGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterGuard").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
