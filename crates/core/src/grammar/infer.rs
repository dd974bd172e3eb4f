//! Positional inference: give every anonymous field an explicit index.
//!
//! A field is anonymous when its `{` is immediately followed by one of
//! `:`, `!`, `.`, `[`, or `}`. Each such field, left to right, receives the
//! next index starting at 0. Escaped braces pass through untouched and
//! consume no index. Fields that already carry a name or index are left
//! alone, so running inference on its own output changes nothing.

/// Characters that mark a `{` as opening an anonymous field.
const ANON_TRIGGERS: &[u8] = b":!.[}";

/// Rewrite `template` so that every anonymous field carries an explicit
/// positional index.
///
/// This is a text rewrite only; it does not validate brace balance.
///
/// ```
/// use etch_core::infer_positional;
///
/// assert_eq!(infer_positional("{} {:d} {x}"), "{0} {1:d} {x}");
/// assert_eq!(infer_positional("{{}} {}"), "{{}} {0}");
/// ```
pub fn infer_positional(template: &str) -> String {
    let b = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 8);
    let mut next_index = 0usize;
    let mut copied = 0usize;
    let mut i = 0usize;

    while i < b.len() {
        let pair = (b[i], b.get(i + 1).copied());
        match pair {
            (b'{', Some(b'{')) | (b'}', Some(b'}')) => i += 2,
            (b'{', Some(t)) if ANON_TRIGGERS.contains(&t) => {
                out.push_str(&template[copied..=i]);
                out.push_str(&next_index.to_string());
                next_index += 1;
                // The trigger is re-emitted with the following text.
                i += 1;
                copied = i;
                i += 1;
            }
            _ => i += 1,
        }
    }
    out.push_str(&template[copied..]);
    out
}

/// Count the anonymous fields [`infer_positional`] would number.
pub fn count_anonymous(template: &str) -> usize {
    let b = template.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < b.len() {
        match (b[i], b.get(i + 1).copied()) {
            (b'{', Some(b'{')) | (b'}', Some(b'}')) => i += 2,
            (b'{', Some(t)) if ANON_TRIGGERS.contains(&t) => {
                count += 1;
                i += 2;
            }
            _ => i += 1,
        }
    }
    count
}
