//! Configuration for the truncation reducer.
//!
//! [`ReducerConfig`] is a plain value type: two configs compare and hash
//! equal exactly when every field matches. Build one with
//! [`ReducerConfig::new`] and chain the `with_*` methods, or deserialize it
//! from JSON. Deserialization runs the same checks as `new`:
//!
//! ```
//! use chat_trim::reducer::{CutSearch, ReducerConfig};
//!
//! let from_code = ReducerConfig::new(20, 5)
//!     .unwrap()
//!     .with_pinned_system_prefix(true);
//!
//! let from_json: ReducerConfig = serde_json::from_str(
//!     r#"{ "target_count": 20, "threshold_count": 5, "pin_system_prefix": true }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(from_code, from_json);
//! assert_eq!(from_json.search, CutSearch::Backward);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Direction in which the reducer looks for a safe cut when the ideal one
/// would split a tool call from its result.
#[derive(Serialize, Deserialize, JsonSchema, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CutSearch {
    /// Move the cut toward the start, keeping more messages. Never retains
    /// fewer than `target_count`.
    #[default]
    Backward,
    /// Move the cut toward the end, keeping fewer messages. Always retains
    /// at least one.
    Forward,
}

impl std::fmt::Display for CutSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutSearch::Backward => write!(f, "backward"),
            CutSearch::Forward => write!(f, "forward"),
        }
    }
}

impl std::str::FromStr for CutSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backward" => Ok(CutSearch::Backward),
            "forward" => Ok(CutSearch::Forward),
            other => Err(format!(
                "unknown cut search '{other}', expected 'backward' or 'forward'"
            )),
        }
    }
}

/// Settings for a [`TruncationReducer`](super::TruncationReducer).
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "RawReducerConfig")]
pub struct ReducerConfig {
    /// Number of messages to keep after a truncation. Must be at least 1.
    pub target_count: usize,
    /// Extra messages tolerated beyond `target_count` before truncating.
    #[serde(default)]
    pub threshold_count: usize,
    /// Where to look when the ideal cut falls inside a call/result pair.
    #[serde(default)]
    pub search: CutSearch,
    /// Within the threshold window, prefer a cut that starts the retained
    /// tail on a user message.
    #[serde(default)]
    pub prefer_user_boundary: bool,
    /// Keep the leading run of system messages out of the count and
    /// re-attach it in front of the retained tail.
    #[serde(default)]
    pub pin_system_prefix: bool,
    /// Reduce automatically whenever a message is pushed onto the reducer.
    #[serde(default)]
    pub auto_reduce: bool,
}

/// Unchecked wire form of [`ReducerConfig`].
#[derive(Deserialize, JsonSchema)]
struct RawReducerConfig {
    target_count: usize,
    #[serde(default)]
    threshold_count: usize,
    #[serde(default)]
    search: CutSearch,
    #[serde(default)]
    prefer_user_boundary: bool,
    #[serde(default)]
    pin_system_prefix: bool,
    #[serde(default)]
    auto_reduce: bool,
}

impl TryFrom<RawReducerConfig> for ReducerConfig {
    type Error = String;

    fn try_from(raw: RawReducerConfig) -> Result<Self, Self::Error> {
        let config = Self {
            target_count: raw.target_count,
            threshold_count: raw.threshold_count,
            search: raw.search,
            prefer_user_boundary: raw.prefer_user_boundary,
            pin_system_prefix: raw.pin_system_prefix,
            auto_reduce: raw.auto_reduce,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ReducerConfig {
    /// Create a config with the given target and threshold and all policy
    /// options at their defaults.
    pub fn new(target_count: usize, threshold_count: usize) -> Result<Self, String> {
        let config = Self {
            target_count,
            threshold_count,
            search: CutSearch::default(),
            prefer_user_boundary: false,
            pin_system_prefix: false,
            auto_reduce: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file. Invalid values are rejected while
    /// parsing.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {e}", path.display()))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("failed to parse config file '{}': {e}", path.display()))
    }

    /// Reject configs the reducer cannot honor.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_count == 0 {
            return Err("target_count must be at least 1".to_string());
        }
        if self.target_count.checked_add(self.threshold_count).is_none() {
            return Err(format!(
                "target_count + threshold_count overflows (target={}, threshold={})",
                self.target_count, self.threshold_count
            ));
        }
        Ok(())
    }

    /// Largest history size that does not trigger a truncation.
    pub fn trigger_len(&self) -> usize {
        self.target_count.saturating_add(self.threshold_count)
    }

    /// Set the slack threshold.
    pub fn with_threshold(mut self, threshold_count: usize) -> Self {
        self.threshold_count = threshold_count;
        self
    }

    /// Set the search direction for a safe cut.
    pub fn with_search(mut self, search: CutSearch) -> Self {
        self.search = search;
        self
    }

    /// Prefer cuts that open the retained tail on a user message.
    pub fn with_user_boundary(mut self, enabled: bool) -> Self {
        self.prefer_user_boundary = enabled;
        self
    }

    /// Pin the leading system messages in front of every retained tail.
    pub fn with_pinned_system_prefix(mut self, enabled: bool) -> Self {
        self.pin_system_prefix = enabled;
        self
    }

    /// Reduce on every pushed message.
    pub fn with_auto_reduce(mut self, enabled: bool) -> Self {
        self.auto_reduce = enabled;
        self
    }
}
