//! Property checks for the truncation reducer over generated histories.
//!
//! Histories mix user turns, plain assistant replies, and assistant
//! tool-call blocks (one to three parallel calls followed by their results),
//! so the cut search meets every pair layout: adjacent pairs, nested
//! parallel calls, and tails made entirely of one block.

use chat_trim::prelude::*;
use chat_trim::reducer::{PairMap, evaluate, extract_range};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Turn {
    User,
    Reply,
    Calls(usize),
}

fn turn() -> impl Strategy<Value = Turn> {
    prop_oneof![
        1 => Just(Turn::User),
        1 => Just(Turn::Reply),
        2 => (1usize..=3).prop_map(Turn::Calls),
    ]
}

fn build(turns: &[Turn]) -> Vec<Message> {
    let mut out = Vec::new();
    let mut call_no = 0;
    for turn in turns {
        match turn {
            Turn::User => out.push(Message::user(format!("user {}", out.len()))),
            Turn::Reply => out.push(Message::assistant_text(format!("reply {}", out.len()))),
            Turn::Calls(n) => {
                let ids: Vec<String> = (0..*n)
                    .map(|_| {
                        call_no += 1;
                        format!("call-{call_no}")
                    })
                    .collect();
                out.push(Message::assistant_tool_calls(
                    ids.iter()
                        .map(|id| ToolCall::function(id.clone(), "lookup", "{}"))
                        .collect(),
                ));
                for id in ids {
                    out.push(Message::tool_result(id, "ok"));
                }
            }
        }
    }
    out
}

fn histories() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(turn(), 0..24).prop_map(|turns| build(&turns))
}

fn configs() -> impl Strategy<Value = ReducerConfig> {
    (1usize..=8, 0usize..=3).prop_map(|(target, threshold)| {
        ReducerConfig::new(target, threshold).expect("target is at least 1")
    })
}

fn policy_variant(base: ReducerConfig, variant: u8) -> ReducerConfig {
    match variant {
        0 => base,
        1 => base.with_search(CutSearch::Forward),
        2 => base.with_user_boundary(true),
        _ => base.with_pinned_system_prefix(true),
    }
}

proptest! {
    #[test]
    fn within_window_never_truncates(history in histories(), config in configs()) {
        let history = &history[..history.len().min(config.trigger_len())];
        prop_assert_eq!(evaluate(history, &config), None);
    }

    #[test]
    fn plain_history_cuts_to_exact_target(config in configs(), extra in 1usize..10) {
        let len = config.trigger_len() + extra;
        let history: Vec<Message> = (0..len).map(|i| Message::user(format!("{i}"))).collect();
        let cut = evaluate(&history, &config);
        prop_assert_eq!(cut, Some(len - config.target_count));
        prop_assert_eq!(extract_range(&history, len - config.target_count).len(), config.target_count);
    }

    #[test]
    fn backward_cuts_split_no_pair_and_keep_at_least_target(
        history in histories(),
        config in configs(),
    ) {
        let Some(cut) = evaluate(&history, &config) else {
            return Ok(());
        };
        prop_assert!(cut >= 1);
        prop_assert!(history.len() - cut >= config.target_count);

        let pairs = PairMap::build(&history);
        prop_assert!(
            pairs.spans().iter().all(|span| !span.straddles(cut)),
            "cut {} splits a pair", cut
        );
    }

    #[test]
    fn backward_cut_is_the_nearest_safe_index(history in histories(), config in configs()) {
        prop_assume!(history.len() > config.trigger_len());
        let pairs = PairMap::build(&history);
        let ideal = history.len() - config.target_count;
        let expected = (1..=ideal).rev().find(|&i| pairs.is_safe_cut(i));
        prop_assert_eq!(evaluate(&history, &config), expected);
    }

    #[test]
    fn forward_cuts_split_no_pair_and_keep_something(
        history in histories(),
        config in configs(),
    ) {
        let config = config.with_search(CutSearch::Forward);
        let Some(cut) = evaluate(&history, &config) else {
            return Ok(());
        };
        prop_assert!(cut >= history.len() - config.target_count);
        prop_assert!(cut < history.len());
        let pairs = PairMap::build(&history);
        prop_assert!(pairs.spans().iter().all(|span| !span.straddles(cut)));
    }

    #[test]
    fn reducer_is_idempotent_for_every_policy(
        generated in histories(),
        base in configs(),
        variant in 0u8..4,
    ) {
        let config = policy_variant(base, variant);
        let mut history = vec![Message::system("You are a careful assistant.")];
        history.extend(generated);

        let mut reducer = TruncationReducer::with_history(config, history);
        reducer.reduce();
        prop_assert_eq!(reducer.reduce(), ReduceOutcome::Unchanged);
    }

    #[test]
    fn user_boundary_stays_inside_threshold_window(
        history in histories(),
        config in configs(),
    ) {
        let config = config.with_user_boundary(true);
        let Some(cut) = evaluate(&history, &config) else {
            return Ok(());
        };
        let plain_cut = evaluate(&history, &config.clone().with_user_boundary(false));
        if history[cut].is_user() && Some(cut) != plain_cut {
            prop_assert!(history.len() - cut <= config.trigger_len());
        } else {
            prop_assert_eq!(Some(cut), plain_cut);
        }
    }

    #[test]
    fn pinned_system_prompt_always_survives(generated in histories(), config in configs()) {
        let config = config.with_pinned_system_prefix(true);
        let mut history = vec![Message::system("rules")];
        history.extend(generated);

        let mut reducer = TruncationReducer::with_history(config, history);
        reducer.reduce();
        prop_assert_eq!(&reducer.messages()[0], &Message::system("rules"));
        prop_assert_eq!(reducer.messages().iter().filter(|m| m.is_system()).count(), 1);
    }
}

#[test]
fn worked_examples_from_twelve_and_six_messages() {
    let config = ReducerConfig::new(5, 2).unwrap();

    let twelve: Vec<Message> = (0..12).map(|i| Message::user(format!("{i}"))).collect();
    assert_eq!(evaluate(&twelve, &config), Some(7));
    let tail = extract_range(&twelve, 7);
    assert_eq!(tail.len(), 5);
    assert_eq!(tail, twelve[7..12].to_vec());

    let six: Vec<Message> = (0..6).map(|i| Message::user(format!("{i}"))).collect();
    assert_eq!(evaluate(&six, &config), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_a_partial_swap() {
    let original: Vec<Message> = (0..40).map(|i| Message::user(format!("{i}"))).collect();
    let expected_tail = original[30..].to_vec();
    let shared = SharedHistory::new(original.clone());
    let config = ReducerConfig::new(10, 0).unwrap();

    let mut readers = Vec::new();
    for _ in 0..4 {
        let handle = shared.clone();
        readers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..200 {
                seen.push(handle.snapshot());
                tokio::task::yield_now().await;
            }
            seen
        }));
    }

    tokio::task::yield_now().await;
    assert!(shared.reduce_with(&config).is_reduced());

    for reader in readers {
        for snapshot in reader.await.unwrap() {
            assert!(
                snapshot == original || snapshot == expected_tail,
                "observed a partial history of {} messages",
                snapshot.len()
            );
        }
    }
    assert_eq!(shared.snapshot(), expected_tail);
}
