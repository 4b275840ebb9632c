// SPDX-License-Identifier: MIT OR Apache-2.0
//! `StackOptions` embedded in a host application's configuration.

use aug_error::{
    CaptureStrategy, ChainPolicy, DEFAULT_CHAIN_DEPTH, ErrorConfig, MAX_CHAIN_DEPTH, OptionsError,
    StackOptions,
};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct HostConfig {
    service: String,
    #[serde(default)]
    errors: StackOptions,
}

fn validation_reasons(err: OptionsError) -> Vec<String> {
    match err {
        OptionsError::ValidationError { reasons } => reasons,
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Embedding
// ---------------------------------------------------------------------------

#[test]
fn section_is_optional() {
    let config: HostConfig = toml::from_str("service = \"uploader\"").unwrap();
    assert_eq!(config.service, "uploader");
    assert_eq!(config.errors, StackOptions::default());
}

#[test]
fn section_is_read_from_host_toml() {
    let config: HostConfig = toml::from_str(
        r#"
        service = "uploader"

        [errors]
        capture = "fallback"

        [errors.chain]
        policy = "follow_augmented"
        "#,
    )
    .unwrap();
    assert_eq!(config.errors.capture, CaptureStrategy::Fallback);
    assert_eq!(
        config.errors.chain,
        ChainPolicy::FollowAugmented {
            max_depth: DEFAULT_CHAIN_DEPTH
        }
    );
    config.errors.validate().unwrap();
}

#[test]
fn section_is_read_from_host_json() {
    let config: HostConfig = serde_json::from_str(
        r#"{ "service": "uploader", "errors": { "chain": { "policy": "single_hop" } } }"#,
    )
    .unwrap();
    assert_eq!(config.errors.chain, ChainPolicy::SingleHop);
    assert_eq!(config.errors.capture, CaptureStrategy::Unwind);
}

#[test]
fn loaded_options_drive_stack_assembly() {
    let options = StackOptions::from_toml("[chain]\npolicy = \"follow_augmented\"\nmax_depth = 1")
        .unwrap();
    let root = ErrorConfig::new().name("Root").build();
    let middle = ErrorConfig::new().name("Middle").error(root).build();
    let top = ErrorConfig::new()
        .name("Top")
        .error(middle)
        .options(options)
        .build();
    let stack = top.stack().unwrap();
    assert!(stack.ends_with("\n-> Root"), "{stack}");
    assert_eq!(stack.matches("\n-> ").count(), 2, "{stack}");
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn boundary_depths_are_accepted() {
    for max_depth in [1, MAX_CHAIN_DEPTH] {
        StackOptions::default()
            .with_chain(ChainPolicy::FollowAugmented { max_depth })
            .validate()
            .unwrap_or_else(|e| panic!("depth {max_depth}: {e}"));
    }
}

#[test]
fn out_of_range_depths_are_rejected() {
    for max_depth in [0, MAX_CHAIN_DEPTH + 1, usize::MAX] {
        let err = StackOptions::default()
            .with_chain(ChainPolicy::FollowAugmented { max_depth })
            .validate()
            .unwrap_err();
        let reasons = validation_reasons(err);
        assert_eq!(reasons.len(), 1, "{reasons:?}");
        assert!(reasons[0].starts_with("chain.max_depth"), "{reasons:?}");
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = StackOptions::from_toml("capture = ").unwrap_err();
    assert!(matches!(err, OptionsError::ParseError { .. }), "{err:?}");
}

#[test]
fn wrong_types_are_parse_errors() {
    let err = StackOptions::from_toml("[chain]\npolicy = \"follow_augmented\"\nmax_depth = \"deep\"")
        .unwrap_err();
    assert!(matches!(err, OptionsError::ParseError { .. }), "{err:?}");
}
