//! Property tests for the Python-literal parser.

use proptest::prelude::*;
use roastlog::alog::Value;

/// Literal-safe strings: no quotes or backslashes, so `Display` output
/// stays parseable by a Python-compatible reader.
fn safe_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.:%-]{0,24}"
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        // Finite floats only; Artisan never writes nan/inf and the parser
        // rejects them.
        prop::num::f64::NORMAL.prop_map(Value::Float),
        safe_string().prop_map(Value::Str),
    ];
    leaf.prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec((safe_string(), inner), 0..6).prop_map(Value::Dict),
        ]
    })
}

/// Numeric-tolerant equality: `5.0` round-trips as the integer `5`.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| value_eq(a, b))
        }
        (Value::Dict(x), Value::Dict(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && value_eq(va, vb))
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

proptest! {
    /// Displaying and re-parsing a value tree preserves it.
    #[test]
    fn roundtrip_display_parse(value in arb_value()) {
        let text = value.to_string();
        let reparsed = Value::parse(&text).unwrap_or_else(|e| {
            panic!("failed to reparse {text:?}: {e}");
        });
        prop_assert!(value_eq(&value, &reparsed), "{value:?} != {reparsed:?} (text {text:?})");
    }

    /// The parser never panics, whatever bytes arrive.
    #[test]
    fn never_panics_on_arbitrary_input(input in "\\PC{0,256}") {
        let _ = Value::parse(&input);
    }

    /// Numbers survive a parse in either representation.
    #[test]
    fn numbers_parse(n in prop::num::f64::NORMAL) {
        let text = format!("{n}");
        let parsed = Value::parse(&text).unwrap();
        prop_assert_eq!(parsed.as_f64(), Some(n));
    }
}
