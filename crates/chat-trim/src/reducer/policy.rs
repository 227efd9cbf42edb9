//! The truncation decision: whether to cut a history, and where.
//!
//! [`evaluate`] is a pure function of the messages and the config. It
//! returns `None` both when the history is still inside its slack window and
//! when no cut exists that keeps every call/result pair whole; callers treat
//! the two the same way.

use super::config::{CutSearch, ReducerConfig};
use super::pairing::PairMap;
use crate::Message;
use tracing::{debug, info, trace};

/// Index of the first retained message after a truncation.
pub type CutIndex = usize;

/// Length of the leading run of system messages.
pub fn pinned_prefix_len(history: &[Message]) -> usize {
    history.iter().take_while(|m| m.is_system()).count()
}

/// Find the index at which `history` should be cut, if at all.
///
/// The ideal cut leaves exactly `target_count` messages. When the message
/// there continues a call/result pair, the cut moves in the configured
/// [`CutSearch`] direction to the nearest index that splits no pair. With
/// [`prefer_user_boundary`](ReducerConfig::prefer_user_boundary) the cut may
/// then move further back, but never past the threshold window, to start
/// the tail on a user message.
///
/// With [`pin_system_prefix`](ReducerConfig::pin_system_prefix) the leading
/// system messages are excluded from the counts and the cut always lands
/// after them.
pub fn evaluate(history: &[Message], config: &ReducerConfig) -> Option<CutIndex> {
    let pinned = if config.pin_system_prefix {
        pinned_prefix_len(history)
    } else {
        0
    };
    let unpinned = history.len() - pinned;

    if unpinned <= config.trigger_len() {
        debug!(
            "History within window: {} message(s), target={}, threshold={}",
            unpinned, config.target_count, config.threshold_count
        );
        return None;
    }

    info!("Performing chat history truncation check...");

    let pairs = PairMap::build(history);
    // unpinned > target, so the ideal cut is always past the pinned prefix.
    let ideal = history.len() - config.target_count;
    // At least one message is always retained, even for an unvalidated
    // config with a zero target.
    let last = history.len() - 1;

    let safe = match config.search {
        CutSearch::Backward => (pinned + 1..=ideal.min(last))
            .rev()
            .find(|&i| pairs.is_safe_cut(i)),
        CutSearch::Forward => (ideal..history.len()).find(|&i| pairs.is_safe_cut(i)),
    };

    let Some(safe) = safe else {
        info!(
            "No truncation index found. target_count={}, threshold_count={}, search={}",
            config.target_count, config.threshold_count, config.search
        );
        return None;
    };

    if safe != ideal {
        trace!("Ideal cut {ideal} splits a tool call pair; moved to {safe}");
    }

    if config.prefer_user_boundary {
        let floor = history.len() - config.trigger_len();
        let user_cut = (floor..=safe)
            .rev()
            .find(|&i| history[i].is_user() && pairs.is_safe_cut(i));
        if let Some(user_cut) = user_cut {
            trace!("Aligned cut {safe} to user message at {user_cut}");
            return Some(user_cut);
        }
    }

    Some(safe)
}

/// The contiguous tail of `history` starting at `start`.
///
/// `start == 0` yields the whole history; a `start` at or past the end
/// yields an empty one.
pub fn extract_range(history: &[Message], start: CutIndex) -> Vec<Message> {
    history.get(start..).map(<[Message]>::to_vec).unwrap_or_default()
}
