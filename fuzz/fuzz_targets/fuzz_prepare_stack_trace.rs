// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the formatting hook with structured frames.
//!
//! Builds arbitrary `StackFrame`s and verifies:
//! 1. `prepare_stack_trace` never panics, including on unrenderable frames.
//! 2. Every entry is prefixed with `"    at "`.
#![no_main]
use arbitrary::Arbitrary;
use aug_trace::{StackFrame, prepare_stack_trace};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzFrame {
    function: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    address: Option<usize>,
}

fuzz_target!(|input: Vec<FuzzFrame>| {
    let frames: Vec<StackFrame> = input
        .into_iter()
        .map(|f| StackFrame {
            function: f.function.map(|s| s.replace('\n', " ")),
            file: f.file.map(|s| s.replace('\n', " ")),
            line: f.line,
            column: f.column,
            address: f.address,
        })
        .collect();

    // --- Property 1: never panics ---
    let rendered = prepare_stack_trace(&(), &frames);

    // --- Property 2: one prefixed line per frame ---
    if !frames.is_empty() {
        let lines: Vec<&str> = rendered.split('\n').collect();
        assert_eq!(lines.len(), frames.len());
        assert!(lines.iter().all(|l| l.starts_with("    at ")));
    }
});
