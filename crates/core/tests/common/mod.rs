//! Shared test helpers for `etch_core` integration tests.

#![allow(unreachable_pub)]

use etch_core::eval::{ArgSource, Evaluator, StandardEvaluator};
use etch_core::{Field, Kwargs, Token, Value};

/// Build keyword arguments from name/value pairs.
#[allow(dead_code)]
pub fn kwargs<const N: usize>(pairs: [(&str, Value); N]) -> Kwargs {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// String values, in order.
#[allow(dead_code)]
pub fn strs(items: &[&str]) -> Vec<Value> {
    items.iter().map(|s| Value::from(*s)).collect()
}

/// Format a whole template positionally with the standard evaluator.
#[allow(dead_code)]
pub fn eval_positional(template: &str, args: &[Value]) -> String {
    StandardEvaluator
        .evaluate(template, ArgSource::Positional(args))
        .unwrap_or_else(|e| panic!("failed to format {template:?}: {e}"))
}

/// Fields of a token sequence, in order.
#[allow(dead_code)]
pub fn fields(tokens: &[Token]) -> Vec<&Field> {
    tokens.iter().filter_map(Token::as_field).collect()
}

/// Field names of a token sequence, in order.
#[allow(dead_code)]
pub fn field_names(tokens: &[Token]) -> Vec<String> {
    fields(tokens).iter().map(|f| f.name().to_string()).collect()
}
