//! Emitter: turns a token sequence back into template text.
//!
//! Literal braces are re-escaped, so `tokenize(emit(tokenize(t)))` yields
//! the same tokens as `tokenize(t)`.

use super::tokenize::Token;

/// Emit template text for `tokens`.
pub fn emit_template(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Literal(text) => push_escaped(&mut out, text),
            Token::Field(field) => out.push_str(&field.canonical()),
        }
    }
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            _ => out.push(c),
        }
    }
}
