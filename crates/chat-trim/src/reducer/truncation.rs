//! The truncation reducer: a history container plus a [`ReducerConfig`].

use super::config::ReducerConfig;
use super::policy::{evaluate, extract_range, pinned_prefix_len};
use crate::Message;
use crate::history::{ChatHistory, HistoryContainer};
use std::hash::{Hash, Hasher};
use tracing::info;

/// Result of one reduction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOutcome {
    /// No cut was needed, or none was safe.
    Unchanged,
    /// The history was replaced by its retained tail.
    Reduced {
        /// Messages dropped from the front.
        removed: usize,
        /// Messages kept, including any pinned prefix.
        retained: usize,
    },
}

impl ReduceOutcome {
    /// Whether any messages were removed.
    pub fn is_reduced(&self) -> bool {
        matches!(self, ReduceOutcome::Reduced { .. })
    }
}

impl std::fmt::Display for ReduceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReduceOutcome::Unchanged => write!(f, "unchanged"),
            ReduceOutcome::Reduced { removed, retained } => {
                write!(f, "reduced: removed {removed}, retained {retained}")
            }
        }
    }
}

/// Compute the messages that survive a reduction of `history`, or `None`
/// when it should stay as it is.
///
/// The pinned system prefix, when enabled, is copied in front of the tail.
pub fn truncate(history: &[Message], config: &ReducerConfig) -> Option<Vec<Message>> {
    let cut = evaluate(history, config)?;

    let pinned = if config.pin_system_prefix {
        pinned_prefix_len(history)
    } else {
        0
    };

    let mut kept = Vec::with_capacity(pinned + history.len() - cut);
    kept.extend_from_slice(&history[..pinned]);
    kept.extend(extract_range(history, cut));

    info!(
        "Truncating history at index {cut}: removed {} message(s), retained {}",
        history.len() - kept.len(),
        kept.len()
    );
    Some(kept)
}

/// A chat history that truncates itself to a target size without orphaning
/// tool calls.
///
/// Two reducers are equal when their `target_count` and `threshold_count`
/// match. The other policy options and the messages currently held do not
/// take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct TruncationReducer<H: HistoryContainer = ChatHistory> {
    config: ReducerConfig,
    history: H,
}

impl TruncationReducer<ChatHistory> {
    /// Create a reducer over an empty [`ChatHistory`].
    pub fn new(config: ReducerConfig) -> Self {
        Self::with_history(config, ChatHistory::default())
    }
}

impl<H: HistoryContainer> TruncationReducer<H> {
    /// Create a reducer over an existing history container.
    pub fn with_history(config: ReducerConfig, history: H) -> Self {
        Self { config, history }
    }

    fn window(&self) -> (usize, usize) {
        (self.config.target_count, self.config.threshold_count)
    }

    /// The reducer's settings.
    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// The underlying history container.
    pub fn history(&self) -> &H {
        &self.history
    }

    /// The messages currently held.
    pub fn messages(&self) -> &[Message] {
        self.history.messages()
    }

    /// Give back the history container.
    pub fn into_history(self) -> H {
        self.history
    }

    /// Append a message. With [`auto_reduce`](ReducerConfig::auto_reduce)
    /// enabled this also runs [`reduce`](Self::reduce) and returns its
    /// outcome; otherwise it returns [`ReduceOutcome::Unchanged`].
    pub fn push_message(&mut self, message: Message) -> ReduceOutcome {
        self.history.push(message);
        if self.config.auto_reduce {
            self.reduce()
        } else {
            ReduceOutcome::Unchanged
        }
    }

    /// Truncate the history if it has outgrown the configured window.
    ///
    /// Running this twice with no messages added in between always yields
    /// [`ReduceOutcome::Unchanged`] the second time.
    pub fn reduce(&mut self) -> ReduceOutcome {
        let before = self.history.len();
        match truncate(self.history.messages(), &self.config) {
            Some(kept) => {
                let retained = kept.len();
                self.history.replace_messages(kept);
                ReduceOutcome::Reduced {
                    removed: before - retained,
                    retained,
                }
            }
            None => ReduceOutcome::Unchanged,
        }
    }
}

impl<H: HistoryContainer> PartialEq for TruncationReducer<H> {
    fn eq(&self, other: &Self) -> bool {
        self.window() == other.window()
    }
}

impl<H: HistoryContainer> Eq for TruncationReducer<H> {}

impl<H: HistoryContainer> Hash for TruncationReducer<H> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        "TruncationReducer".hash(state);
        self.window().hash(state);
    }
}
