//! History reduction: deciding where to cut and applying the cut.
//!
//! The pieces, from the bottom up:
//!
//! 1. **[`pairing`]**: maps each assistant tool call to the tool message
//!    that answers it, and reports which indices would split a pair.
//!
//! 2. **[`policy`]**: [`evaluate`] turns a history and a [`ReducerConfig`]
//!    into an optional cut index; [`extract_range`] slices the tail.
//!    Both are pure.
//!
//! 3. **[`truncation`]**: [`TruncationReducer`] owns a history container and
//!    a config, and replaces the messages with the retained tail when
//!    [`reduce()`](TruncationReducer::reduce) finds a cut.
//!
//! Truncation is deferred until the history exceeds
//! `target_count + threshold_count`, so a busy conversation is cut once per
//! `threshold_count + 1` messages rather than on every append.

pub mod config;
pub mod pairing;
pub mod policy;
pub mod truncation;

pub use config::{CutSearch, ReducerConfig};
pub use pairing::{PairMap, PairSpan};
pub use policy::{CutIndex, evaluate, extract_range, pinned_prefix_len};
pub use truncation::{ReduceOutcome, TruncationReducer, truncate};
