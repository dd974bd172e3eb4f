//! Tokenizer, emitter, and splitter behavior on whole templates.

mod common;

use common::{field_names, fields};
use etch_core::{Accessor, Token, ValueType, emit_template, split_template, tokenize};
use pretty_assertions::assert_eq;

#[test]
fn inference_applies_only_when_asked() {
    let raw = tokenize("{} and {}", false).unwrap();
    assert_eq!(field_names(&raw), vec!["", ""]);
    let inferred = tokenize("{} and {}", true).unwrap();
    assert_eq!(field_names(&inferred), vec!["0", "1"]);
    assert!(fields(&inferred).iter().all(|f| f.is_positional()));
}

#[test]
fn field_model_is_populated() {
    let tokens = tokenize("{user.name!r:>{width}}", false).unwrap();
    let field = fields(&tokens)[0];
    assert_eq!(field.base_name(), "user");
    assert_eq!(field.subpath(), &[Accessor::Attr("name".into())]);
    assert_eq!(field.conversion(), Some('r'));
    assert_eq!(field.format_spec(), ">{width}");
    assert_eq!(field.nested_names(), &["width".to_string()]);
    assert_eq!(field.inferred_type(), ValueType::String);
    assert!(!field.is_positional());
}

#[test]
fn empty_literals_are_dropped() {
    let tokens = tokenize("{a}{b}", false).unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.as_field().is_some()));
}

#[test]
fn escapes_decode_into_literals() {
    let tokens = tokenize("{{x}} = {x}", false).unwrap();
    let text: String = tokens.iter().filter_map(Token::as_literal).collect();
    assert_eq!(text, "{x} = ");
}

#[test]
fn emitted_text_tokenizes_back() {
    for t in [
        "plain",
        "{{literal}} {x!r:>4} {0[k]}",
        "{hello!r:{fchar}{width}}, {width}, yes",
        "a }} b {{ c {:d}",
    ] {
        let tokens = tokenize(t, false).unwrap();
        let emitted = emit_template(&tokens);
        assert_eq!(tokenize(&emitted, false).unwrap(), tokens, "round trip of {t:?}");
    }
}

#[test]
fn split_pairs_literals_with_fields() {
    let parts = split_template("Hi {name}, you owe {amt:.2f}{{!}}.").unwrap();
    let expected: Vec<(String, Option<String>)> = vec![
        ("Hi ".into(), Some("{name}".into())),
        (", you owe ".into(), Some("{amt:.2f}".into())),
        ("{!}.".into(), None),
    ];
    assert_eq!(parts, expected);
}

#[test]
fn malformed_templates_fail_to_tokenize() {
    for t in ["{", "}", "{x", "{x!}", "{x!rr}", "{a[}", "{a.}"] {
        let err = tokenize(t, false).unwrap_err();
        assert!(err.is_parse_error(), "{t:?} gave {err:?}");
    }
}
