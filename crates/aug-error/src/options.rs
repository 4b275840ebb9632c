// SPDX-License-Identifier: MIT OR Apache-2.0
//! Capture and stack-assembly settings.

use aug_trace::CaptureStrategy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upper bound accepted for [`ChainPolicy::FollowAugmented`] depth.
pub const MAX_CHAIN_DEPTH: usize = 1024;

/// Depth used when a follow-augmented policy does not name one.
pub const DEFAULT_CHAIN_DEPTH: usize = 32;

/// Errors from loading or validating [`StackOptions`].
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// The text could not be parsed as TOML.
    #[error("failed to parse stack options: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// The options parsed but are out of range.
    #[error("stack options validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

/// How far the stack of an error unwinds its cause chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ChainPolicy {
    /// Append the immediate cause's full stack and stop.
    ///
    /// Deeper causes still appear, but only because the immediate cause's own
    /// stack already embeds them.
    #[default]
    SingleHop,
    /// Append one segment per augmented error in the chain, then one final
    /// line for the first cause that is not an augmented error.
    FollowAugmented {
        /// Augmented links to print before the walk is cut short.
        #[serde(default = "default_chain_depth")]
        max_depth: usize,
    },
}

fn default_chain_depth() -> usize {
    DEFAULT_CHAIN_DEPTH
}

impl ChainPolicy {
    /// [`FollowAugmented`](Self::FollowAugmented) with the default depth.
    pub fn follow_augmented() -> Self {
        Self::FollowAugmented {
            max_depth: DEFAULT_CHAIN_DEPTH,
        }
    }
}

/// Capture and stack-assembly settings for an error.
///
/// Can be embedded in a host application's configuration file:
///
/// ```
/// use aug_error::{CaptureStrategy, ChainPolicy, StackOptions};
///
/// let options = StackOptions::from_toml(
///     r#"
///     capture = "fallback"
///
///     [chain]
///     policy = "follow_augmented"
///     max_depth = 8
///     "#,
/// )
/// .unwrap();
/// assert_eq!(options.capture, CaptureStrategy::Fallback);
/// assert_eq!(options.chain, ChainPolicy::FollowAugmented { max_depth: 8 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StackOptions {
    /// How the call site is captured.
    #[serde(default)]
    pub capture: CaptureStrategy,
    /// How the cause chain is unwound.
    #[serde(default)]
    pub chain: ChainPolicy,
}

impl StackOptions {
    /// Parse and validate options from TOML.
    pub fn from_toml(content: &str) -> Result<Self, OptionsError> {
        let options: Self = toml::from_str(content).map_err(|e| OptionsError::ParseError {
            reason: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let mut reasons = Vec::new();
        if let ChainPolicy::FollowAugmented { max_depth } = self.chain {
            if max_depth == 0 {
                reasons.push("chain.max_depth must be at least 1".to_owned());
            }
            if max_depth > MAX_CHAIN_DEPTH {
                reasons.push(format!(
                    "chain.max_depth {max_depth} exceeds the maximum of {MAX_CHAIN_DEPTH}"
                ));
            }
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(OptionsError::ValidationError { reasons })
        }
    }

    /// Replace the capture strategy.
    #[must_use]
    pub fn with_capture(mut self, capture: CaptureStrategy) -> Self {
        self.capture = capture;
        self
    }

    /// Replace the chain policy.
    #[must_use]
    pub fn with_chain(mut self, chain: ChainPolicy) -> Self {
        self.chain = chain;
        self
    }
}
