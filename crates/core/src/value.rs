//! Dynamic argument values passed to templates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Keyword arguments, keyed by field name.
pub type Kwargs = BTreeMap<String, Value>;

/// A template argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (`null` in JSON).
    None,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Ordered sequence, indexable with `[n]`.
    List(Vec<Value>),
    /// String-keyed mapping, reachable with `.key` or `[key]`.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Plain text form (`!s` conversion).
    pub fn to_plain(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_repr(),
        }
    }

    /// Debug form (`!r` conversion): strings are quoted and escaped.
    pub fn to_repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, false);
        out
    }

    /// Like [`Value::to_repr`] with all non-ASCII characters escaped (`!a`).
    pub fn to_ascii_repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, true);
        out
    }

    fn write_repr(&self, out: &mut String, ascii: bool) {
        match self {
            Value::None => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&float_repr(*f)),
            Value::Str(s) => quote_into(out, s, ascii),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out, ascii);
                }
                out.push(']');
            }
            Value::Map(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    quote_into(out, k, ascii);
                    out.push_str(": ");
                    v.write_repr(out, ascii);
                }
                out.push('}');
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}

/// Shortest float text that still reads as a float (`1.0`, not `1`).
pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".into()
    } else if f.is_infinite() {
        if f > 0.0 { "inf".into() } else { "-inf".into() }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn quote_into(out: &mut String, s: &str, ascii: bool) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if ascii && !c.is_ascii() => {
                let n = c as u32;
                if n <= 0xff {
                    out.push_str(&format!("\\x{n:02x}"));
                } else if n <= 0xffff {
                    out.push_str(&format!("\\u{n:04x}"));
                } else {
                    out.push_str(&format!("\\U{n:08x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Build keyword arguments from a JSON object; other JSON kinds yield none.
pub fn kwargs_from_json(json: serde_json::Value) -> Kwargs {
    match Value::from(json) {
        Value::Map(map) => map,
        _ => Kwargs::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repr_quoting() {
        assert_eq!(Value::from("repr").to_repr(), "'repr'");
        assert_eq!(Value::from("it's").to_repr(), "\"it's\"");
        assert_eq!(Value::from("a\nb").to_repr(), "'a\\nb'");
        assert_eq!(Value::from("é").to_ascii_repr(), "'\\xe9'");
        assert_eq!(Value::from("é").to_repr(), "'é'");
    }

    #[test]
    fn plain_forms() {
        assert_eq!(Value::Float(1.0).to_plain(), "1.0");
        assert_eq!(Value::Float(2.5).to_plain(), "2.5");
        assert_eq!(Value::Bool(true).to_plain(), "True");
        assert_eq!(Value::None.to_plain(), "None");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).to_plain(),
            "[1, 'a']"
        );
    }

    #[test]
    fn from_json_document() {
        let kw = kwargs_from_json(serde_json::json!({"n": 3, "x": 1.5, "s": "hi", "z": null}));
        assert_eq!(kw["n"], Value::Int(3));
        assert_eq!(kw["x"], Value::Float(1.5));
        assert_eq!(kw["s"], Value::from("hi"));
        assert_eq!(kw["z"], Value::None);
        assert!(kwargs_from_json(serde_json::json!([1, 2])).is_empty());
    }
}
