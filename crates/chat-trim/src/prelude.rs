//! Convenience re-exports for common `chat-trim` types.
//!
//! ```ignore
//! use chat_trim::prelude::*;
//! ```
//!
//! Pairing internals ([`PairMap`](crate::reducer::PairMap)) and the free
//! policy functions stay in [`reducer`](crate::reducer); import them from
//! there when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Message, MessageRole, ToolCall, json_schema_for};

// ── History containers ──────────────────────────────────────────────
pub use crate::history::{ChatHistory, HistoryContainer, SharedHistory};

// ── Reduction ───────────────────────────────────────────────────────
pub use crate::reducer::{CutSearch, ReduceOutcome, ReducerConfig, TruncationReducer};
