// SPDX-License-Identifier: MIT OR Apache-2.0
//! Call-site capture.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace as StdBacktrace, BacktraceStatus};
use std::fmt;
use tracing::debug;

use crate::format::current_formatter;
use crate::frame::StackFrame;

/// Frames of the capture machinery itself, always dropped from the top of a trace.
const CAPTURE_FRAMES: &[&str] = &[
    "backtrace::backtrace::",
    "backtrace::capture::",
    "std::backtrace",
    "aug_trace::capture::CallTrace",
];

/// How a [`CallTrace`] obtains its frames.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    /// Walk the stack with the `backtrace` unwinder and defer symbol resolution
    /// until the trace is rendered.
    #[default]
    Unwind,
    /// Force-capture a throwaway [`std::backtrace::Backtrace`] and harvest its
    /// frames from the text form.
    Fallback,
}

impl CaptureStrategy {
    /// The strategy this build will actually use when `self` is requested.
    ///
    /// [`Unwind`](Self::Unwind) degrades to [`Fallback`](Self::Fallback) when
    /// the `unwind` feature is disabled.
    pub fn effective(self) -> Self {
        if cfg!(feature = "unwind") {
            self
        } else {
            Self::Fallback
        }
    }
}

impl fmt::Display for CaptureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unwind => "unwind",
            Self::Fallback => "fallback",
        })
    }
}

// ---------------------------------------------------------------------------
// CallTrace
// ---------------------------------------------------------------------------

enum RawTrace {
    #[cfg(feature = "unwind")]
    Unwind(backtrace::Backtrace),
    Harvested(StdBacktrace),
}

/// Opaque capture of the call stack at a point in time.
///
/// Symbol resolution is deferred until [`frames`](Self::frames) or
/// [`render`](Self::render) is called.
pub struct CallTrace {
    raw: RawTrace,
    boundary: &'static [&'static str],
}

impl CallTrace {
    /// Capture the current call stack.
    ///
    /// `boundary` lists function-path fragments of the caller's own
    /// constructors. The leading run of frames matching them (or the capture
    /// machinery) is dropped, so the trace starts at whoever called the
    /// constructor. Capture never fails: an unsupported platform simply yields
    /// an empty trace.
    #[inline(never)]
    pub fn capture(strategy: CaptureStrategy, boundary: &'static [&'static str]) -> Self {
        let effective = strategy.effective();
        if effective != strategy {
            debug!(
                target: "aug.trace",
                requested = %strategy,
                "unwinder not compiled in, harvesting a std backtrace"
            );
        }
        let raw = match effective {
            #[cfg(feature = "unwind")]
            CaptureStrategy::Unwind => RawTrace::Unwind(backtrace::Backtrace::new_unresolved()),
            _ => RawTrace::Harvested(StdBacktrace::force_capture()),
        };
        Self { raw, boundary }
    }

    /// Strategy that produced this trace.
    pub fn strategy(&self) -> CaptureStrategy {
        match self.raw {
            #[cfg(feature = "unwind")]
            RawTrace::Unwind(_) => CaptureStrategy::Unwind,
            RawTrace::Harvested(_) => CaptureStrategy::Fallback,
        }
    }

    /// Resolve the captured frames, constructor frames excluded.
    pub fn frames(&self) -> Vec<StackFrame> {
        let frames = match &self.raw {
            #[cfg(feature = "unwind")]
            RawTrace::Unwind(trace) => {
                let mut trace = trace.clone();
                trace.resolve();
                unwound_frames(&trace)
            }
            RawTrace::Harvested(trace) => match trace.status() {
                BacktraceStatus::Captured => parse_std_backtrace(&trace.to_string()),
                _ => Vec::new(),
            },
        };
        trim_boundary(frames, self.boundary)
    }

    /// Render the frames with the formatter currently installed on this thread.
    pub fn render(&self) -> String {
        let frames = self.frames();
        current_formatter()(self, &frames)
    }
}

impl fmt::Debug for CallTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallTrace")
            .field("strategy", &self.strategy())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "unwind")]
fn unwound_frames(trace: &backtrace::Backtrace) -> Vec<StackFrame> {
    let mut frames = Vec::new();
    for frame in trace.frames() {
        let address = Some(frame.ip() as usize);
        let symbols = frame.symbols();
        if symbols.is_empty() {
            frames.push(StackFrame {
                address,
                ..StackFrame::default()
            });
            continue;
        }
        // Inlined calls show up as several symbols on one frame.
        for symbol in symbols {
            frames.push(StackFrame {
                function: symbol.name().map(|name| format!("{name:#}")),
                file: symbol.filename().map(|path| path.display().to_string()),
                line: symbol.lineno(),
                column: symbol.colno(),
                address,
            });
        }
    }
    frames
}

fn trim_boundary(frames: Vec<StackFrame>, boundary: &[&str]) -> Vec<StackFrame> {
    let internal = |name: &str| {
        CAPTURE_FRAMES
            .iter()
            .chain(boundary)
            .any(|marker| name.contains(marker))
    };
    let mut cut = 0;
    for (index, frame) in frames.iter().enumerate() {
        match frame.function.as_deref() {
            Some(name) if internal(name) => cut = index + 1,
            Some(_) => break,
            None => {}
        }
    }
    frames.into_iter().skip(cut).collect()
}

// ---------------------------------------------------------------------------
// std backtrace harvesting
// ---------------------------------------------------------------------------

/// Parse the text form of a [`std::backtrace::Backtrace`] into frames.
///
/// Recognises `"  N: symbol"` lines, each optionally followed by an
/// `"at path:line:column"` line. Anything else is ignored.
///
/// ```
/// let text = "   0: app::main\n             at ./src/main.rs:4:5\n   1: <unknown>";
/// let frames = aug_trace::parse_std_backtrace(text);
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[0].function.as_deref(), Some("app::main"));
/// assert_eq!(frames[0].line, Some(4));
/// assert_eq!(frames[1].function, None);
/// ```
pub fn parse_std_backtrace(text: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    apply_location(frame, location.trim());
                }
            }
            continue;
        }
        let Some((index, symbol)) = line.split_once(':') else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let symbol = symbol.trim();
        frames.push(StackFrame {
            function: (!symbol.is_empty() && symbol != "<unknown>").then(|| symbol.to_owned()),
            ..StackFrame::default()
        });
    }
    frames
}

fn apply_location(frame: &mut StackFrame, location: &str) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().and_then(|s| s.parse::<u32>().ok());
    let middle = parts.next();
    let rest = parts.next();
    match (last, middle, rest) {
        (Some(column), Some(line), Some(file)) if line.parse::<u32>().is_ok() => {
            frame.file = Some(file.to_owned());
            frame.line = line.parse().ok();
            frame.column = Some(column);
        }
        (Some(line), Some(_), _) => {
            let file = location.rsplit_once(':').map_or(location, |(file, _)| file);
            frame.file = Some(file.to_owned());
            frame.line = Some(line);
        }
        _ => frame.file = Some(location.to_owned()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STD_TEXT: &str = "   0: aug_trace::capture::CallTrace::capture
             at ./src/capture.rs:88:34
   1: my_app::handlers::load
             at ./src/handlers.rs:17:9
   2: <unknown>
   3: my_app::main
             at C:\\work\\my_app\\src\\main.rs:5:5";

    #[test]
    fn parses_symbols_and_locations() {
        let frames = parse_std_backtrace(STD_TEXT);
        assert_eq!(frames.len(), 4);
        assert_eq!(
            frames[1],
            StackFrame::new("my_app::handlers::load").at("./src/handlers.rs", Some(17), Some(9))
        );
        assert_eq!(frames[2], StackFrame::default());
        assert_eq!(frames[3].file.as_deref(), Some("C:\\work\\my_app\\src\\main.rs"));
        assert_eq!(frames[3].line, Some(5));
    }

    #[test]
    fn parses_location_without_column() {
        let frames = parse_std_backtrace("0: f\n   at lib.rs:7");
        assert_eq!(frames[0].file.as_deref(), Some("lib.rs"));
        assert_eq!(frames[0].line, Some(7));
        assert_eq!(frames[0].column, None);
    }

    #[test]
    fn parses_location_without_numbers() {
        let frames = parse_std_backtrace("0: f\n   at <built-in>");
        assert_eq!(frames[0].file.as_deref(), Some("<built-in>"));
        assert_eq!(frames[0].line, None);
    }

    #[test]
    fn ignores_noise() {
        let frames = parse_std_backtrace("note: run with RUST_BACKTRACE=full\n   at nowhere.rs:1:1\nx: y");
        assert!(frames.is_empty());
    }

    #[test]
    fn trims_capture_and_constructor_frames() {
        let frames = vec![
            StackFrame::new("backtrace::backtrace::trace"),
            StackFrame {
                address: Some(1),
                ..StackFrame::default()
            },
            StackFrame::new("aug_trace::capture::CallTrace::capture"),
            StackFrame::new("my_error::Thing::new"),
            StackFrame::new("my_app::main"),
            StackFrame::new("my_error::Thing::new"),
        ];
        let kept = trim_boundary(frames, &["my_error::Thing::new"]);
        let names: Vec<_> = kept.iter().filter_map(|f| f.function.as_deref()).collect();
        assert_eq!(names, ["my_app::main", "my_error::Thing::new"]);
    }

    #[test]
    fn trims_std_capture_frames() {
        let frames = vec![
            StackFrame::new("std::backtrace_rs::backtrace::libunwind::trace"),
            StackFrame::new("std::backtrace::Backtrace::create"),
            StackFrame::new("std::backtrace::Backtrace::force_capture"),
            StackFrame::new("backtrace::capture::Backtrace::new_unresolved"),
            StackFrame::new("my_app::main"),
        ];
        let kept = trim_boundary(frames, &[]);
        assert_eq!(kept, [StackFrame::new("my_app::main")]);
    }

    #[test]
    fn caller_modules_named_backtrace_are_kept() {
        let frames = vec![
            StackFrame::new("backtrace::backtrace::trace"),
            StackFrame::new("aug_trace::capture::CallTrace::capture"),
            StackFrame::new("my_app::backtrace::load"),
            StackFrame::new("my_app::main"),
        ];
        let kept = trim_boundary(frames, &[]);
        let names: Vec<_> = kept.iter().filter_map(|f| f.function.as_deref()).collect();
        assert_eq!(names, ["my_app::backtrace::load", "my_app::main"]);
    }

    #[test]
    fn trimming_keeps_unnamed_traces() {
        let frames = vec![
            StackFrame {
                address: Some(1),
                ..StackFrame::default()
            },
            StackFrame {
                address: Some(2),
                ..StackFrame::default()
            },
        ];
        assert_eq!(trim_boundary(frames.clone(), &["x"]), frames);
    }

    #[test]
    fn fallback_capture_sees_caller() {
        let trace = CallTrace::capture(CaptureStrategy::Fallback, &[]);
        assert_eq!(trace.strategy(), CaptureStrategy::Fallback);
        let frames = trace.frames();
        assert!(
            frames
                .iter()
                .filter_map(|f| f.function.as_deref())
                .any(|name| name.contains("fallback_capture_sees_caller")),
            "{frames:?}"
        );
        assert!(
            frames
                .first()
                .and_then(|f| f.function.as_deref())
                .is_none_or(|name| !name.contains("aug_trace::capture::CallTrace")),
            "{frames:?}"
        );
    }

    #[cfg(feature = "unwind")]
    #[test]
    fn unwind_capture_sees_caller() {
        let trace = CallTrace::capture(CaptureStrategy::Unwind, &[]);
        assert_eq!(trace.strategy(), CaptureStrategy::Unwind);
        let frames = trace.frames();
        assert!(
            frames
                .iter()
                .filter_map(|f| f.function.as_deref())
                .any(|name| name.contains("unwind_capture_sees_caller")),
            "{frames:?}"
        );
    }

    #[test]
    fn render_uses_installed_formatter() {
        fn count(_context: &dyn std::any::Any, frames: &[StackFrame]) -> String {
            format!("{} frames", frames.len())
        }
        let trace = CallTrace::capture(CaptureStrategy::Fallback, &[]);
        let _guard = crate::FormatterGuard::install(count);
        assert_eq!(trace.render(), format!("{} frames", trace.frames().len()));
    }

    #[test]
    fn strategy_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&CaptureStrategy::Fallback).unwrap(),
            r#""fallback""#
        );
        let back: CaptureStrategy = serde_json::from_str(r#""unwind""#).unwrap();
        assert_eq!(back, CaptureStrategy::Unwind);
    }
}
