//! History containers the reducer can operate on.
//!
//! [`HistoryContainer`] is the capability the reducer needs: read the
//! messages, append one, and swap the whole list. [`ChatHistory`] and
//! `Vec<Message>` implement it directly.
//!
//! [`SharedHistory`] is for a history that other threads or tasks read
//! while it is being reduced:
//!
//! ```text
//! writer ──push / reduce_with──▶ Arc<Mutex<Vec<Message>>> ◀──snapshot── readers
//! ```
//!
//! The reduction is evaluated and swapped in under one lock, so a reader
//! sees either the full old list or the full new one.

use crate::Message;
use crate::reducer::{ReduceOutcome, ReducerConfig, truncate};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Something that holds an ordered list of messages.
pub trait HistoryContainer {
    /// The messages, oldest first.
    fn messages(&self) -> &[Message];

    /// Replace every message with `messages`.
    fn replace_messages(&mut self, messages: Vec<Message>);

    /// Append a message at the end.
    fn push(&mut self, message: Message);

    fn len(&self) -> usize {
        self.messages().len()
    }

    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

impl HistoryContainer for Vec<Message> {
    fn messages(&self) -> &[Message] {
        self
    }

    fn replace_messages(&mut self, messages: Vec<Message>) {
        *self = messages;
    }

    fn push(&mut self, message: Message) {
        Vec::push(self, message);
    }
}

/// An ordered chat history. Serializes as a bare JSON array of messages.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the messages out of the history.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for ChatHistory {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl FromIterator<Message> for ChatHistory {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl HistoryContainer for ChatHistory {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// A cloneable handle to a history shared across threads or tasks.
#[derive(Clone, Debug, Default)]
pub struct SharedHistory(Arc<Mutex<Vec<Message>>>);

impl SharedHistory {
    /// Share `messages` behind a new handle.
    pub fn new(messages: Vec<Message>) -> Self {
        Self(Arc::new(Mutex::new(messages)))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current messages.
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Append a message under the lock.
    pub fn push(&self, message: Message) {
        self.lock().push(message);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Reduce the shared history in place.
    ///
    /// The cut is computed and the retained tail swapped in while holding
    /// the lock, so concurrent [`snapshot`](Self::snapshot) calls never see
    /// a partially replaced list.
    pub fn reduce_with(&self, config: &ReducerConfig) -> ReduceOutcome {
        let mut guard = self.lock();
        let before = guard.len();
        match truncate(&guard, config) {
            Some(kept) => {
                let retained = kept.len();
                *guard = kept;
                ReduceOutcome::Reduced {
                    removed: before - retained,
                    retained,
                }
            }
            None => ReduceOutcome::Unchanged,
        }
    }
}
