//! Positional inference, checked by rendering inferred templates.

mod common;

use common::{eval_positional, kwargs, strs};
use etch_core::{Value, infer_positional};
use pretty_assertions::assert_eq;

#[test]
fn anonymous_fields_render_in_order() {
    let t = infer_positional("{} {} {}");
    assert_eq!(eval_positional(&t, &strs(&["hi", "hello", "bye"])), "hi hello bye");
}

#[test]
fn spec_only_field() {
    let t = infer_positional("{:d} {}");
    assert_eq!(eval_positional(&t, &[Value::Int(1), Value::Int(2)]), "1 2");
}

#[test]
fn conversion_only_fields() {
    let t = infer_positional("{!s} {!r}");
    assert_eq!(eval_positional(&t, &strs(&["str", "repr"])), "str 'repr'");
}

#[test]
fn escaped_braces_do_not_take_an_index() {
    let t = infer_positional("{{joek}} ({} {})");
    assert_eq!(eval_positional(&t, &strs(&["so", "funny"])), "{joek} (so funny)");
}

#[test]
fn access_only_fields() {
    let t = infer_positional("{[hi]}, {.__name__!r}");
    assert_eq!(t, "{0[hi]}, {1.__name__!r}");
    let args = [
        Value::Map(kwargs([("hi", Value::from("hi"))])),
        Value::Map(kwargs([("__name__", Value::from("PositionalFormatArgTest"))])),
    ];
    assert_eq!(eval_positional(&t, &args), "hi, 'PositionalFormatArgTest'");
}

#[test]
fn explicit_indices_keep_their_numbers() {
    let t = infer_positional("{}, {}, {}, {1}");
    assert_eq!(t, "{0}, {1}, {2}, {1}");
    assert_eq!(eval_positional(&t, &strs(&["a", "b", "c"])), "a, b, c, b");
}

#[test]
fn inference_is_idempotent() {
    for t in ["{} {x} {:>{}}", "{{}} {}", "plain", "{0} {}"] {
        let once = infer_positional(t);
        assert_eq!(infer_positional(&once), once, "re-inferring {t:?}");
    }
}
