/// Property tests for purity and the selection rule.
///
/// Random JSON values are pushed through both encoders, the comparator and
/// the selector to check that:
/// - encoding the same value twice yields the same text
/// - comparisons are repeatable and `delta` is the difference of the counts
/// - TOON is chosen exactly when `delta > 0`
/// - forwarded content never carries surrounding whitespace
use proptest::prelude::*;
use serde_json::{Map, Number, Value};
use toon_delta::{
    encode_json, encode_toon, Comparator, FormatLabel, NamedInput, ReportOutcome, Result,
    Selector, SelectorConfig, TokenCounter,
};

/// Fixture vocabulary pinned at one token per Unicode scalar value.
struct CharVocabulary;

impl TokenCounter for CharVocabulary {
    fn count(&self, text: &str) -> Result<usize> {
        Ok(text.chars().count())
    }
}

/// Fixture vocabulary pinned at one token per whitespace-separated word.
struct WordVocabulary;

impl TokenCounter for WordVocabulary {
    fn count(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}",
        "[a-z ]{0,6}",
        Just("".to_string()),
        Just("1st".to_string()),
    ]
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        "[a-zA-Z0-9:,|\\[\\]{}\\-\\. ]{0,12}",
        Just("true".to_string()),
        Just("null".to_string()),
        Just("05".to_string()),
        Just("-x".to_string()),
        Just(" padded ".to_string()),
        Just("tab\there".to_string()),
        Just("caf\u{00e9}".to_string()),
    ]
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1.0e6f64..1.0e6f64).prop_map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number)),
        arb_string().prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_primitive().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn encoders_are_pure(value in arb_value()) {
        prop_assert_eq!(encode_toon(&value), encode_toon(&value));
        prop_assert_eq!(encode_json(&value).unwrap(), encode_json(&value).unwrap());
    }

    #[test]
    fn toon_output_has_no_trailing_newline(value in arb_value()) {
        let toon = encode_toon(&value);
        prop_assert!(!toon.ends_with('\n'));
    }

    #[test]
    fn comparison_is_repeatable(value in arb_value()) {
        let comparator = Comparator::new(&CharVocabulary);
        let first = comparator.compare(&value).unwrap();
        let second = comparator.compare(&value).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first.delta,
            first.baseline_tokens as i64 - first.compact_tokens as i64
        );
    }

    #[test]
    fn toon_chosen_iff_delta_positive(value in arb_value()) {
        let result = Comparator::new(&WordVocabulary).compare(&value).unwrap();
        let expected = if result.delta > 0 { FormatLabel::Toon } else { FormatLabel::Json };
        prop_assert_eq!(result.chosen_label(), expected);
    }

    #[test]
    fn forwarded_content_is_trimmed(value in arb_value(), pad in "[ \t\n]{0,4}") {
        let text = format!("{pad}{}{pad}", serde_json::to_string(&value).unwrap());
        let outcome = Selector::new(&CharVocabulary, SelectorConfig::default())
            .run([NamedInput::text("v.json", text)]);
        prop_assert_eq!(outcome.reports.len(), 1);
        prop_assert!(
            matches!(outcome.reports[0].outcome, ReportOutcome::Selected { .. }),
            "unexpected failure: {}",
            outcome.reports[0]
        );
        let content = &outcome.payload[0].content;
        prop_assert_eq!(content.as_str(), content.trim());
    }
}
