//! Call/result pairing: which cut points would orphan a tool call.
//!
//! Every id in an assistant message's `tool_calls` opens a pair; the tool
//! message whose `tool_call_id` names that id closes it. A history cut at
//! index `i` keeps messages `i..`, so it splits a pair exactly when the call
//! sits before `i` and the result at or after it.
//!
//! Tool results whose call is not in the history were orphaned upstream and
//! do not constrain the cut.

use crate::Message;
use std::collections::HashMap;

/// Positions of one tool call and the result that answers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSpan {
    /// Index of the assistant message that made the call.
    pub call_index: usize,
    /// Index of the tool message carrying the result.
    pub result_index: usize,
}

impl PairSpan {
    /// Whether cutting at `index` separates the call from its result.
    pub fn straddles(&self, index: usize) -> bool {
        self.call_index < index && index <= self.result_index
    }
}

/// All pair spans of a history plus a per-index "blocked" table.
#[derive(Debug, Clone, Default)]
pub struct PairMap {
    spans: Vec<PairSpan>,
    blocked: Vec<bool>,
}

impl PairMap {
    /// Scan `messages` once, matching results to the most recent call with
    /// the same id.
    pub fn build(messages: &[Message]) -> Self {
        let mut open: HashMap<&str, usize> = HashMap::new();
        let mut spans = Vec::new();

        for (index, msg) in messages.iter().enumerate() {
            if let Some(id) = msg.tool_call_id.as_deref()
                && let Some(&call_index) = open.get(id)
            {
                spans.push(PairSpan {
                    call_index,
                    result_index: index,
                });
            }
            for id in msg.tool_call_ids() {
                open.insert(id, index);
            }
        }

        let mut blocked = vec![false; messages.len()];
        for span in &spans {
            for slot in &mut blocked[span.call_index + 1..=span.result_index] {
                *slot = true;
            }
        }

        Self { spans, blocked }
    }

    /// Matched pairs, in result order.
    pub fn spans(&self) -> &[PairSpan] {
        &self.spans
    }

    /// Whether a cut at `index` leaves every pair whole. Indices outside
    /// the history are never blocked.
    pub fn is_safe_cut(&self, index: usize) -> bool {
        !self.blocked.get(index).copied().unwrap_or(false)
    }
}
