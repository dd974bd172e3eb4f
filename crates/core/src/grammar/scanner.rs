//! Escape-aware scanner: splits template text into literal runs and raw
//! replacement fields.
//!
//! `{{` and `}}` collapse to a literal `{` / `}`. Any other `{` opens a field
//! that runs to its matching `}` (braces inside the field are counted, so a
//! format spec may carry nested `{name}` placeholders). A lone `}` outside a
//! field is an error.
//!
//! All delimiters are ASCII, so byte-wise scanning never lands inside a
//! multi-byte UTF-8 sequence when it slices on a delimiter.

use std::borrow::Cow;

use crate::error::EtchError;

/// The raw parts of one `{...}` construct, borrowed from the scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField<'a> {
    /// Field name text (everything before `!` or `:`), possibly empty.
    pub name: &'a str,
    /// Format spec text after `:`, empty when absent.
    pub spec: &'a str,
    /// Conversion marker after `!`, if any.
    pub conversion: Option<char>,
    /// Byte offset of the opening `{`.
    pub start: usize,
    /// Byte offset one past the closing `}`.
    pub end: usize,
}

/// A literal run followed by at most one field.
///
/// The literal has escapes already collapsed; it borrows from the input
/// unless an escape pair forced a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Literal text preceding the field.
    pub literal: Cow<'a, str>,
    /// The field that ends this segment, or `None` for trailing text.
    pub field: Option<RawField<'a>>,
}

/// Scan `input` into segments.
///
/// # Errors
/// Returns [`EtchError::MalformedTemplate`] on an unmatched `{` or `}`, a
/// `{` inside a field name, or a conversion marker that is missing or not
/// followed by `:` / `}`.
pub fn scan(input: &str) -> Result<Vec<Segment<'_>>, EtchError> {
    let b = input.as_bytes();
    let mut segments = Vec::new();
    let mut literal = Literal::new(input);
    let mut i = 0usize;

    while i < b.len() {
        match b[i] {
            b'{' if b.get(i + 1) == Some(&b'{') => {
                literal.unescape(i);
                i += 2;
                literal.restart(i);
            }
            b'}' if b.get(i + 1) == Some(&b'}') => {
                literal.unescape(i);
                i += 2;
                literal.restart(i);
            }
            b'}' => return Err(EtchError::malformed(i, "Single '}' encountered")),
            b'{' => {
                let close = matching_close(b, i)?;
                let field = split_field(input, i, close)?;
                segments.push(Segment {
                    literal: literal.take(i),
                    field: Some(field),
                });
                i = close + 1;
                literal.restart(i);
            }
            _ => i += 1,
        }
    }

    let tail = literal.take(b.len());
    if !tail.is_empty() {
        segments.push(Segment {
            literal: tail,
            field: None,
        });
    }
    Ok(segments)
}

/// Literal accumulator that stays borrowed until an escape is seen.
struct Literal<'a> {
    input: &'a str,
    start: usize,
    owned: Option<String>,
}

impl<'a> Literal<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            start: 0,
            owned: None,
        }
    }

    /// Flush `start..=at` (keeping one brace of the escape pair at `at`).
    fn unescape(&mut self, at: usize) {
        self.owned
            .get_or_insert_with(String::new)
            .push_str(&self.input[self.start..=at]);
    }

    fn restart(&mut self, at: usize) {
        self.start = at;
    }

    fn take(&mut self, end: usize) -> Cow<'a, str> {
        let rest = &self.input[self.start..end];
        match self.owned.take() {
            Some(mut s) => {
                s.push_str(rest);
                Cow::Owned(s)
            }
            None => Cow::Borrowed(rest),
        }
    }
}

/// Index of the `}` closing the field opened at `open`.
fn matching_close(b: &[u8], open: usize) -> Result<usize, EtchError> {
    let mut depth = 1usize;
    for (k, &c) in b.iter().enumerate().skip(open + 1) {
        match c {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(k);
                }
            }
            _ => {}
        }
    }
    Err(EtchError::malformed(open, "expected '}' before end of string"))
}

/// Split the body of the field spanning `open..=close` into name,
/// conversion, and spec.
fn split_field(input: &str, open: usize, close: usize) -> Result<RawField<'_>, EtchError> {
    let body_start = open + 1;
    let body = &input[body_start..close];
    let bb = body.as_bytes();

    // Field name ends at the first `!` or `:` outside `[...]`.
    let mut m = 0usize;
    while m < bb.len() {
        match bb[m] {
            b'{' => {
                return Err(EtchError::malformed(
                    body_start + m,
                    "unexpected '{' in field name",
                ));
            }
            b'[' => {
                while m < bb.len() && bb[m] != b']' {
                    m += 1;
                }
                continue;
            }
            b'!' | b':' => break,
            _ => m += 1,
        }
    }

    let name = &body[..m.min(bb.len())];
    let mut conversion = None;
    let mut spec = "";

    if m < bb.len() && bb[m] == b'!' {
        let Some(conv) = body[m + 1..].chars().next() else {
            return Err(EtchError::malformed(
                body_start + m,
                "end of string while looking for conversion specifier",
            ));
        };
        conversion = Some(conv);
        let after = m + 1 + conv.len_utf8();
        if after < bb.len() {
            if bb[after] != b':' {
                return Err(EtchError::malformed(
                    body_start + after,
                    "expected ':' after conversion specifier",
                ));
            }
            spec = &body[after + 1..];
        }
    } else if m < bb.len() {
        spec = &body[m + 1..];
    }

    Ok(RawField {
        name,
        spec,
        conversion,
        start: open,
        end: close + 1,
    })
}
