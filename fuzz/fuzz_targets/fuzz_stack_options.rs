// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz `StackOptions` TOML parsing and validation.
//!
//! Verifies:
//! 1. `StackOptions::from_toml` never panics on arbitrary input.
//! 2. Accepted options always validate.
//! 3. Accepted options survive a TOML round-trip.
#![no_main]
use aug_error::StackOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // --- Property 1: parsing never panics ---
    let Ok(options) = StackOptions::from_toml(s) else {
        return;
    };

    // --- Property 2: accepted options are valid ---
    assert!(options.validate().is_ok());

    // --- Property 3: round-trip ---
    if let Ok(text) = toml::to_string(&options) {
        let back = StackOptions::from_toml(&text).expect("round-trip parse");
        assert_eq!(back, options);
    }
});
