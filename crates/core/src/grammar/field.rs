//! Structured model of a single replacement field.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::scanner::{RawField, scan};
use crate::error::EtchError;

/// Value type implied by a format spec's trailing type character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Integer presentation (`b c d o x X n`).
    Integer,
    /// Floating point presentation (`e E f F g G %`).
    Float,
    /// Anything else, including `s` and no type character at all.
    #[default]
    String,
}

/// Type character lookup, searched front to back.
///
/// `n` appears in both the integer and float groups; the integer entry comes
/// first and wins.
static TYPE_TABLE: &[(char, ValueType)] = &[
    ('b', ValueType::Integer),
    ('c', ValueType::Integer),
    ('d', ValueType::Integer),
    ('o', ValueType::Integer),
    ('x', ValueType::Integer),
    ('X', ValueType::Integer),
    ('n', ValueType::Integer),
    ('e', ValueType::Float),
    ('E', ValueType::Float),
    ('f', ValueType::Float),
    ('F', ValueType::Float),
    ('g', ValueType::Float),
    ('G', ValueType::Float),
    ('n', ValueType::Float),
    ('%', ValueType::Float),
    ('s', ValueType::String),
];

impl ValueType {
    /// Look up the type implied by a type character.
    pub fn from_type_char(c: Option<char>) -> Self {
        c.and_then(|c| TYPE_TABLE.iter().find(|(k, _)| *k == c))
            .map_or(ValueType::String, |(_, t)| *t)
    }
}

/// One step of a compound field name: `.attr` or `[key]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "lowercase")]
pub enum Accessor {
    /// Attribute access, `.name`.
    Attr(String),
    /// Index access, `[key]`. The key is kept as written.
    Index(String),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Attr(a) => write!(f, ".{a}"),
            Accessor::Index(k) => write!(f, "[{k}]"),
        }
    }
}

/// A parsed `{name!conv:spec}` replacement field.
///
/// The derived parts (`base_name`, `subpath`, `nested_names`, `type_char`,
/// `inferred_type`) are always consistent with `name` and `format_spec`;
/// use [`Field::set_format_spec`] to change the spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    base_name: String,
    subpath: Vec<Accessor>,
    is_positional: bool,
    format_spec: String,
    nested_names: Vec<String>,
    conversion: Option<char>,
    type_char: Option<char>,
    inferred_type: ValueType,
}

impl Field {
    /// Build a field from its name, spec, and optional conversion.
    ///
    /// # Errors
    /// [`EtchError::MalformedTemplate`] if the name's access chain is
    /// malformed or the spec nests placeholders more than one level deep.
    pub fn new(
        name: impl Into<String>,
        format_spec: impl Into<String>,
        conversion: Option<char>,
    ) -> Result<Self, EtchError> {
        Self::build(name.into(), format_spec.into(), conversion, 0)
    }

    /// Build a field from a scanner span; error offsets refer to the scanned text.
    pub fn from_raw(raw: &RawField<'_>) -> Result<Self, EtchError> {
        Self::build(
            raw.name.to_string(),
            raw.spec.to_string(),
            raw.conversion,
            raw.start,
        )
    }

    fn build(
        name: String,
        format_spec: String,
        conversion: Option<char>,
        offset: usize,
    ) -> Result<Self, EtchError> {
        let (base, subpath) = split_name(&name, offset)?;
        let base_name = base.to_string();
        let is_positional = base_name.bytes().all(|c| c.is_ascii_digit());
        let mut field = Self {
            name,
            base_name,
            subpath,
            is_positional,
            format_spec: String::new(),
            nested_names: Vec::new(),
            conversion,
            type_char: None,
            inferred_type: ValueType::String,
        };
        field.apply_spec(format_spec, offset)?;
        Ok(field)
    }

    /// Replace the format spec, recomputing nested names and type.
    pub fn set_format_spec(&mut self, spec: impl Into<String>) -> Result<(), EtchError> {
        self.apply_spec(spec.into(), 0)
    }

    fn apply_spec(&mut self, spec: String, offset: usize) -> Result<(), EtchError> {
        self.nested_names = nested_names(&spec, offset)?;
        self.type_char = spec.chars().last();
        self.inferred_type = ValueType::from_type_char(self.type_char);
        self.format_spec = spec;
        Ok(())
    }

    /// The field name exactly as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name up to the first `.` or `[`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Access chain following the base name.
    pub fn subpath(&self) -> &[Accessor] {
        &self.subpath
    }

    /// Whether the base name is empty or all decimal digits.
    pub fn is_positional(&self) -> bool {
        self.is_positional
    }

    /// Whether the base name is empty.
    pub fn is_anonymous(&self) -> bool {
        self.base_name.is_empty()
    }

    /// Whether the name carries an access chain.
    pub fn is_compound(&self) -> bool {
        !self.subpath.is_empty()
    }

    /// Raw format spec text.
    pub fn format_spec(&self) -> &str {
        &self.format_spec
    }

    /// Names referenced by placeholders inside the format spec, deduplicated
    /// in first-seen order.
    pub fn nested_names(&self) -> &[String] {
        &self.nested_names
    }

    /// Conversion marker, e.g. `r` for `{x!r}`.
    pub fn conversion(&self) -> Option<char> {
        self.conversion
    }

    /// Last character of the format spec.
    pub fn type_char(&self) -> Option<char> {
        self.type_char
    }

    /// Type implied by [`Field::type_char`].
    pub fn inferred_type(&self) -> ValueType {
        self.inferred_type
    }

    /// Canonical `{name!conv:spec}` text for this field.
    pub fn canonical(&self) -> String {
        construct_field(Some(&self.name), &self.format_spec, self.conversion)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Serialize a field construct; a missing name yields the empty string.
pub fn construct_field(name: Option<&str>, spec: &str, conversion: Option<char>) -> String {
    let Some(name) = name else {
        return String::new();
    };
    let mut out = String::with_capacity(name.len() + spec.len() + 4);
    out.push('{');
    out.push_str(name);
    if let Some(c) = conversion {
        out.push('!');
        out.push(c);
    }
    if !spec.is_empty() {
        out.push(':');
        out.push_str(spec);
    }
    out.push('}');
    out
}

/// Split a field name into its base and access chain.
fn split_name(name: &str, offset: usize) -> Result<(&str, Vec<Accessor>), EtchError> {
    let cut = name.find(['.', '[']).unwrap_or(name.len());
    let (base, mut rest) = name.split_at(cut);
    let mut path = Vec::new();

    while let Some(c) = rest.chars().next() {
        if c == '.' {
            let body = &rest[1..];
            let end = body.find(['.', '[']).unwrap_or(body.len());
            if end == 0 {
                return Err(EtchError::malformed(offset, "Empty attribute in format string"));
            }
            path.push(Accessor::Attr(body[..end].to_string()));
            rest = &body[end..];
        } else {
            let body = &rest[1..];
            let Some(end) = body.find(']') else {
                return Err(EtchError::malformed(offset, "Missing ']' in format string"));
            };
            if end == 0 {
                return Err(EtchError::malformed(offset, "Empty attribute in format string"));
            }
            path.push(Accessor::Index(body[..end].to_string()));
            rest = &body[end + 1..];
            if !rest.is_empty() && !rest.starts_with(['.', '[']) {
                return Err(EtchError::malformed(
                    offset,
                    "Only '.' or '[' may follow ']' in format field specifier",
                ));
            }
        }
    }
    Ok((base, path))
}

/// Collect placeholder names from a spec, allowing one level of nesting only.
fn nested_names(spec: &str, offset: usize) -> Result<Vec<String>, EtchError> {
    if !spec.contains(['{', '}']) {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = Vec::new();
    for seg in scan(spec).map_err(|e| shift(e, offset))? {
        let Some(sub) = seg.field else { continue };
        if nested_has_field(sub.spec) {
            return Err(EtchError::malformed(
                offset + sub.start,
                "Max string recursion exceeded",
            ));
        }
        if !names.iter().any(|n| n == sub.name) {
            names.push(sub.name.to_string());
        }
    }
    Ok(names)
}

fn nested_has_field(spec: &str) -> bool {
    spec.contains('{')
        && scan(spec).map_or(true, |segs| segs.iter().any(|s| s.field.is_some()))
}

fn shift(err: EtchError, by: usize) -> EtchError {
    match err {
        EtchError::MalformedTemplate { offset, message } => EtchError::MalformedTemplate {
            offset: offset + by,
            message,
        },
        other => other,
    }
}
