//! Formatting evaluator seam.
//!
//! The renderer hands each field's canonical text to an [`Evaluator`] along
//! with the arguments it may draw on. [`StandardEvaluator`] is the bundled
//! implementation of the brace mini-language; callers with their own
//! formatting rules implement the trait instead.

/// Format spec parsing and application.
pub mod spec;

use std::borrow::Cow;

use crate::error::EtchError;
use crate::grammar::field::{Accessor, Field};
use crate::grammar::scanner::{RawField, scan};
use crate::value::{Kwargs, Value};

pub use spec::{FormatSpec, apply_spec};

/// Failure while formatting a template or a single field.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// No positional argument at this index.
    #[error("positional argument {0} is missing")]
    MissingPositional(usize),

    /// No keyword argument with this name.
    #[error("keyword argument {0:?} is missing")]
    MissingKeyword(String),

    /// `.attr` access found nothing.
    #[error("{type_name} value has no attribute {attr:?}")]
    MissingAttribute {
        /// Attribute name.
        attr: String,
        /// Type of the value being accessed.
        type_name: &'static str,
    },

    /// `[key]` access found nothing.
    #[error("{type_name} value has no item {key:?}")]
    MissingIndex {
        /// Key as written.
        key: String,
        /// Type of the value being indexed.
        type_name: &'static str,
    },

    /// Conversion marker other than `s`, `r`, or `a`.
    #[error("unknown conversion specifier {0}")]
    UnknownConversion(char),

    /// The format spec could not be parsed or is not valid for the value.
    #[error("{0}")]
    InvalidSpec(String),

    /// The type character does not apply to the value's type.
    #[error("unknown format code '{code}' for object of type '{type_name}'")]
    UnsupportedType {
        /// Presentation type character.
        code: char,
        /// Type of the value being formatted.
        type_name: &'static str,
    },

    /// Automatic and manual field numbering were mixed.
    #[error("cannot mix automatic field numbering with manual field specification")]
    AutoNumbering,

    /// The template text itself is malformed.
    #[error("malformed template: {0}")]
    Template(String),
}

impl From<EtchError> for EvalError {
    fn from(err: EtchError) -> Self {
        EvalError::Template(err.to_string())
    }
}

/// The arguments a template is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum ArgSource<'a> {
    /// An ordered argument sequence, reached with numeric or empty names.
    Positional(&'a [Value]),
    /// A name-to-value mapping, reached with keyword names.
    Keyword(&'a Kwargs),
}

/// Formats template text against an argument source.
pub trait Evaluator {
    /// Format `template`, returning the rendered text.
    fn evaluate(&self, template: &str, args: ArgSource<'_>) -> Result<String, EvalError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, template: &str, args: ArgSource<'_>) -> Result<String, EvalError> {
        (**self).evaluate(template, args)
    }
}

/// The bundled brace mini-language evaluator.
///
/// Supports automatic and manual numbering, `.attr` / `[key]` access on
/// maps and lists, the `s`, `r`, and `a` conversions, one level of nested
/// placeholders inside a spec, and the specs described in [`spec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl Evaluator for StandardEvaluator {
    fn evaluate(&self, template: &str, args: ArgSource<'_>) -> Result<String, EvalError> {
        let mut numbering = Numbering::Unset;
        let mut out = String::with_capacity(template.len());
        for seg in scan(template)? {
            out.push_str(&seg.literal);
            if let Some(raw) = seg.field {
                out.push_str(&render_field(&raw, args, &mut numbering)?);
            }
        }
        Ok(out)
    }
}

/// Field numbering mode for one evaluation.
enum Numbering {
    Unset,
    Auto(usize),
    Manual,
}

impl Numbering {
    fn next_auto(&mut self) -> Result<usize, EvalError> {
        match self {
            Numbering::Manual => Err(EvalError::AutoNumbering),
            Numbering::Unset => {
                *self = Numbering::Auto(1);
                Ok(0)
            }
            Numbering::Auto(n) => {
                let i = *n;
                *n += 1;
                Ok(i)
            }
        }
    }

    fn manual(&mut self) -> Result<(), EvalError> {
        match self {
            Numbering::Auto(_) => Err(EvalError::AutoNumbering),
            _ => {
                *self = Numbering::Manual;
                Ok(())
            }
        }
    }
}

fn render_field(
    raw: &RawField<'_>,
    args: ArgSource<'_>,
    numbering: &mut Numbering,
) -> Result<String, EvalError> {
    let field = Field::from_raw(raw)?;
    let value = resolve(&field, args, numbering)?;
    let value = convert(value, field.conversion())?;
    let spec = if field.format_spec().contains('{') {
        Cow::Owned(expand_spec(field.format_spec(), args, numbering)?)
    } else {
        Cow::Borrowed(field.format_spec())
    };
    apply_spec(&value, &spec)
}

/// Substitute the placeholders inside a spec. Field construction already
/// rejected anything nested deeper than this.
fn expand_spec(
    spec: &str,
    args: ArgSource<'_>,
    numbering: &mut Numbering,
) -> Result<String, EvalError> {
    let mut out = String::new();
    for seg in scan(spec)? {
        out.push_str(&seg.literal);
        if let Some(raw) = seg.field {
            let field = Field::from_raw(&raw)?;
            let value = resolve(&field, args, numbering)?;
            let value = convert(value, field.conversion())?;
            out.push_str(&apply_spec(&value, field.format_spec())?);
        }
    }
    Ok(out)
}

fn resolve<'a>(
    field: &Field,
    args: ArgSource<'a>,
    numbering: &mut Numbering,
) -> Result<Cow<'a, Value>, EvalError> {
    let base = field.base_name();
    let mut value = if field.is_positional() {
        let index = if base.is_empty() {
            numbering.next_auto()?
        } else {
            numbering.manual()?;
            base.parse::<usize>()
                .map_err(|_| EvalError::Template("Too many decimal digits in format string".into()))?
        };
        let found = match args {
            ArgSource::Positional(values) => values.get(index),
            ArgSource::Keyword(_) => None,
        };
        found.ok_or(EvalError::MissingPositional(index))?
    } else {
        let found = match args {
            ArgSource::Keyword(map) => map.get(base),
            ArgSource::Positional(_) => None,
        };
        found.ok_or_else(|| EvalError::MissingKeyword(base.to_string()))?
    };

    for step in field.subpath() {
        value = access(value, step)?;
    }
    Ok(Cow::Borrowed(value))
}

fn access<'a>(value: &'a Value, step: &Accessor) -> Result<&'a Value, EvalError> {
    let found = match (value, step) {
        (Value::Map(map), Accessor::Attr(key) | Accessor::Index(key)) => map.get(key),
        (Value::List(items), Accessor::Index(key)) => {
            key.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    };
    found.ok_or_else(|| match step {
        Accessor::Attr(attr) => EvalError::MissingAttribute {
            attr: attr.clone(),
            type_name: value.type_name(),
        },
        Accessor::Index(key) => EvalError::MissingIndex {
            key: key.clone(),
            type_name: value.type_name(),
        },
    })
}

fn convert(value: Cow<'_, Value>, conversion: Option<char>) -> Result<Cow<'_, Value>, EvalError> {
    Ok(match conversion {
        None => value,
        Some('s') => Cow::Owned(Value::Str(value.to_plain())),
        Some('r') => Cow::Owned(Value::Str(value.to_repr())),
        Some('a') => Cow::Owned(Value::Str(value.to_ascii_repr())),
        Some(other) => return Err(EvalError::UnknownConversion(other)),
    })
}
