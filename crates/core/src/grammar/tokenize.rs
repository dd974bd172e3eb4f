//! Tokenizer: template text into literal and field tokens.

use serde::Serialize;

use super::field::{Field, construct_field};
use super::infer::infer_positional;
use super::scanner::scan;
use crate::error::EtchError;

/// One element of a tokenized template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Token {
    /// Literal text, escapes already collapsed.
    Literal(String),
    /// A replacement field.
    Field(Field),
}

impl Token {
    /// The field, if this token is one.
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Token::Field(f) => Some(f),
            Token::Literal(_) => None,
        }
    }

    /// The literal text, if this token is one.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Token::Literal(s) => Some(s),
            Token::Field(_) => None,
        }
    }
}

/// Tokenize a template into literals and fields, in source order.
///
/// With `resolve_positional`, anonymous fields are numbered first (see
/// [`infer_positional`]). Empty literal runs are not emitted.
///
/// # Errors
/// [`EtchError::MalformedTemplate`] for unbalanced braces, bad conversion
/// markers, malformed access chains, or over-deep spec nesting.
pub fn tokenize(template: &str, resolve_positional: bool) -> Result<Vec<Token>, EtchError> {
    let inferred;
    let source = if resolve_positional {
        inferred = infer_positional(template);
        inferred.as_str()
    } else {
        template
    };

    let mut tokens = Vec::new();
    for seg in scan(source)? {
        if !seg.literal.is_empty() {
            tokens.push(Token::Literal(seg.literal.into_owned()));
        }
        if let Some(raw) = seg.field {
            tokens.push(Token::Field(Field::from_raw(&raw)?));
        }
    }
    Ok(tokens)
}

/// Split a template into `(literal, field)` pairs without building field
/// models; each field is given in canonical form.
pub fn split_template(template: &str) -> Result<Vec<(String, Option<String>)>, EtchError> {
    Ok(scan(template)?
        .into_iter()
        .map(|seg| {
            let field = seg
                .field
                .map(|f| construct_field(Some(f.name), f.spec, f.conversion));
            (seg.literal.into_owned(), field)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_fields_in_order() {
        let toks = tokenize("example 4: {hello!r:{fchar}{width}}, {width}, yes", true).unwrap();
        assert_eq!(toks.len(), 5);
        assert_eq!(toks[0].as_literal(), Some("example 4: "));
        assert_eq!(toks[1].as_field().unwrap().name(), "hello");
        assert_eq!(toks[3].as_field().unwrap().name(), "width");
        assert_eq!(toks[4].as_literal(), Some(", yes"));
    }

    #[test]
    fn adjacent_fields_have_no_empty_literal() {
        let toks = tokenize("{}{}", true).unwrap();
        assert_eq!(toks.len(), 2);
        assert!(toks.iter().all(|t| t.as_field().is_some()));
    }

    #[test]
    fn inference_is_optional() {
        let toks = tokenize("{}", false).unwrap();
        assert!(toks[0].as_field().unwrap().is_anonymous());
        let toks = tokenize("{}", true).unwrap();
        assert_eq!(toks[0].as_field().unwrap().name(), "0");
    }

    #[test]
    fn split_pairs() {
        assert_eq!(
            split_template("example 2: {hello:*10}").unwrap(),
            vec![
                ("example 2: ".to_string(), Some("{hello:*10}".to_string())),
            ]
        );
        assert_eq!(
            split_template("a{{b").unwrap(),
            vec![("a{b".to_string(), None)]
        );
    }
}
