//! Property-based tests for the Store parser.
//!
//! These check invariants that must hold for any input: the parser never
//! panics, repeated parses agree, failed rules leave the position untouched,
//! and every position recorded in a report is consistent with the text.

use std::collections::HashMap;

use libstore::{Parser, Position, Rule, Value};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Strategies
// =============================================================================

/// Short strings drawn from the characters the grammar cares about.
fn arb_store_text() -> impl Strategy<Value = String> {
    let alphabet = vec![
        'a', 'x', '1', '9', '0', '-', '+', '.', 'e', 'E', '"', '\\', 'u', 'D', '(', ')', '[', ']',
        '{', '}', '=', ':', ',', ';', ' ', '\t', '\n', '\r', 'ä', '☃',
    ];
    prop::collection::vec(prop::sample::select(alphabet), 0..48)
        .prop_map(|chars| chars.into_iter().collect::<String>())
}

fn arb_word() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_][a-z0-9_.-]{0,8}").unwrap()
}

/// Recompute the position of a byte offset from scratch.
fn position_of(input: &str, index: usize) -> Position {
    let mut position = Position::start();
    for c in input[..index].chars() {
        position.advance(c);
    }
    position
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn prop_never_panics(input in "\\PC{0,64}") {
        let mut parser = Parser::new();
        let _ = parser.parse(&input);
        prop_assert!(parser.report().is_some());
    }

    #[test]
    fn prop_outcome_matches_report(input in arb_store_text()) {
        let mut parser = Parser::new();
        let value = parser.parse(&input);
        let report = parser.report().unwrap();
        prop_assert_eq!(value.is_some(), report.success);
        prop_assert_eq!(value.is_none(), parser.error().is_some());
        if value.is_some() {
            prop_assert_eq!(parser.position(), position_of(&input, input.len()));
        } else {
            prop_assert_eq!(parser.position(), Position::start());
        }
    }

    #[test]
    fn prop_idempotent(input in arb_store_text()) {
        let mut parser = Parser::new();
        let first = parser.parse(&input);
        let first_report = parser.take_report();
        let second = parser.parse(&input);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first_report.as_ref(), parser.report());
    }

    #[test]
    fn prop_report_positions_are_consistent(input in arb_store_text()) {
        let mut parser = Parser::new();
        parser.parse(&input);
        for (_, node) in parser.report().unwrap().nodes() {
            prop_assert!(input.is_char_boundary(node.position.index));
            prop_assert_eq!(node.position, position_of(&input, node.position.index));
        }
    }

    #[test]
    fn prop_failed_rule_does_not_move(input in arb_store_text()) {
        let rules = [
            Rule::Value, Rule::Int, Rule::Float, Rule::String,
            Rule::List, Rule::Elements, Rule::Map, Rule::Entries,
        ];
        let mut parser = Parser::new();
        for rule in rules {
            match parser.parse_rule(rule, &input) {
                Some(_) => {
                    prop_assert!(parser.position().index <= input.len());
                }
                None => {
                    prop_assert_eq!(parser.position(), Position::start());
                }
            }
        }
    }

    #[test]
    fn prop_integers(n in any::<i64>()) {
        let mut parser = Parser::new();
        prop_assert_eq!(parser.parse(&n.to_string()), Some(Value::Int(n)));
    }

    #[test]
    fn prop_bare_word_lists(words in prop::collection::vec(arb_word(), 0..8)) {
        let input = format!("[{}]", words.join(" "));
        let expected = Value::List(words.into_iter().map(Value::String).collect());
        let mut parser = Parser::new();
        prop_assert_eq!(parser.parse(&input), Some(expected));
    }

    #[test]
    fn prop_entries_last_write_wins(
        entries in prop::collection::vec(("[a-d]", -1000i64..1000), 1..12)
    ) {
        let input: Vec<String> = entries.iter().map(|(k, v)| format!("{} = {};", k, v)).collect();
        let mut expected = HashMap::new();
        for (k, v) in entries {
            expected.insert(k, Value::Int(v));
        }
        let mut parser = Parser::new();
        prop_assert_eq!(parser.parse(&input.join("\n")), Some(Value::Map(expected)));
    }
}
