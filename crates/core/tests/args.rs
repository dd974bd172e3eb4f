//! Argument extraction over representative templates.

use etch_core::{
    EtchError, KeywordArg, PositionalArg, ValueType, extract_args, infer_and_extract,
    infer_positional,
};
use pretty_assertions::assert_eq;

fn kw(name: &str, ty: ValueType) -> KeywordArg {
    KeywordArg {
        name: name.into(),
        ty,
    }
}

fn pos(index: usize, ty: ValueType) -> PositionalArg {
    PositionalArg { index, ty }
}

#[test]
fn single_keyword() {
    let reqs = infer_and_extract("example 1: {hello}").unwrap();
    assert_eq!(reqs.keyword, vec![kw("hello", ValueType::String)]);
    assert!(reqs.positional.is_empty());
}

#[test]
fn fill_and_width_spec_is_string() {
    let reqs = infer_and_extract("example 2: {hello:*10}").unwrap();
    assert_eq!(reqs.keyword, vec![kw("hello", ValueType::String)]);
}

#[test]
fn nested_width_is_a_keyword() {
    let reqs = infer_and_extract("example 3: {hello:*{width}}").unwrap();
    assert_eq!(
        reqs.keyword,
        vec![kw("hello", ValueType::String), kw("width", ValueType::String)]
    );
}

#[test]
fn nested_names_deduplicate_with_fields() {
    let reqs = infer_and_extract("example 4: {hello!r:{fchar}{width}}, {width}, yes").unwrap();
    assert_eq!(
        reqs.keyword,
        vec![
            kw("hello", ValueType::String),
            kw("fchar", ValueType::String),
            kw("width", ValueType::String),
        ]
    );
}

#[test]
fn positional_types_first_seen_wins() {
    let reqs = extract_args("example 5: {0}, {1:d}, {2:f}, {1}").unwrap();
    assert_eq!(
        reqs.positional,
        vec![
            pos(0, ValueType::String),
            pos(1, ValueType::Integer),
            pos(2, ValueType::Float),
        ]
    );
}

#[test]
fn inferred_then_explicit_repeat() {
    let reqs = extract_args(&infer_positional("example 6: {}, {}, {}, {1}")).unwrap();
    assert_eq!(
        reqs.positional,
        vec![
            pos(0, ValueType::String),
            pos(1, ValueType::String),
            pos(2, ValueType::String),
        ]
    );
}

#[test]
fn numeric_nested_name_is_positional() {
    let reqs = extract_args("{0:{1}}").unwrap();
    assert_eq!(
        reqs.positional,
        vec![pos(0, ValueType::String), pos(1, ValueType::String)]
    );
}

#[test]
fn mixed_keyword_and_positional() {
    let reqs = extract_args("{0:x} {name:.2%} {1:n}").unwrap();
    assert_eq!(
        reqs.positional,
        vec![pos(0, ValueType::Integer), pos(1, ValueType::Integer)]
    );
    assert_eq!(reqs.keyword, vec![kw("name", ValueType::Float)]);
    assert_eq!(reqs.min_positional_len(), 2);
}

#[test]
fn compound_names_are_rejected() {
    assert!(matches!(
        extract_args("{.__name__!r}"),
        Err(EtchError::CompoundName { .. })
    ));
    assert!(matches!(
        extract_args("{0[hi]}"),
        Err(EtchError::CompoundName { .. })
    ));
    assert!(matches!(
        extract_args("{x:{a.b}}"),
        Err(EtchError::CompoundName { .. })
    ));
}

#[test]
fn anonymous_fields_are_rejected() {
    assert!(matches!(extract_args("{} {}"), Err(EtchError::AnonymousField)));
    assert!(matches!(extract_args("{:d}"), Err(EtchError::AnonymousField)));
}

#[test]
fn malformed_templates_are_rejected() {
    for t in ["{0", "0}", "{0:{1:{2}}}"] {
        let err = extract_args(t).unwrap_err();
        assert!(err.is_parse_error(), "{t:?} gave {err:?}");
    }
}

#[test]
fn literal_only_template_needs_nothing() {
    let reqs = extract_args("{{not a field}}").unwrap();
    assert!(reqs.is_empty());
}
