// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the std backtrace text parser.
//!
//! Feeds arbitrary text through `parse_std_backtrace`, verifying:
//! 1. Parsing never panics.
//! 2. Every parsed frame renders through the formatting hook without panics.
//! 3. The hook emits exactly one line per parsed frame.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // --- Property 1: parsing never panics ---
    let frames = aug_trace::parse_std_backtrace(text);

    // --- Property 2 & 3: rendering is total and line-preserving ---
    let rendered = aug_trace::prepare_stack_trace(&(), &frames);
    if !frames.is_empty() {
        assert_eq!(rendered.split('\n').count(), frames.len());
    }
});
