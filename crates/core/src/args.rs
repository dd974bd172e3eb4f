//! Argument extraction: what a template needs from its caller.
//!
//! The template must already be positionally inferred; anonymous and
//! compound fields are rejected rather than guessed at.

use serde::Serialize;

use crate::error::EtchError;
use crate::grammar::field::{Field, ValueType};
use crate::grammar::infer::infer_positional;
use crate::grammar::scanner::scan;

/// A required positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionalArg {
    /// Index into the positional arguments.
    pub index: usize,
    /// Type implied by the first field that referenced this index.
    pub ty: ValueType,
}

/// A required keyword argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordArg {
    /// Keyword name.
    pub name: String,
    /// Type implied by the first field that referenced this name.
    pub ty: ValueType,
}

/// Deduplicated argument requirements, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgRequirements {
    /// Positional requirements.
    pub positional: Vec<PositionalArg>,
    /// Keyword requirements.
    pub keyword: Vec<KeywordArg>,
}

impl ArgRequirements {
    /// Whether the template needs no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Smallest positional argument count that satisfies every index.
    pub fn min_positional_len(&self) -> usize {
        self.positional
            .iter()
            .map(|a| a.index + 1)
            .max()
            .unwrap_or(0)
    }

    /// Look up the recorded type for a keyword.
    pub fn keyword_type(&self, name: &str) -> Option<ValueType> {
        self.keyword.iter().find(|a| a.name == name).map(|a| a.ty)
    }

    /// Record `name` unless its key was already seen. The first type wins.
    fn add(&mut self, name: &str, ty: ValueType) -> Result<(), EtchError> {
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            let index = name.parse::<usize>().map_err(|_| {
                EtchError::malformed(0, format!("positional index {name} is out of range"))
            })?;
            if !self.positional.iter().any(|a| a.index == index) {
                self.positional.push(PositionalArg { index, ty });
            }
        } else if !self.keyword.iter().any(|a| a.name == name) {
            self.keyword.push(KeywordArg {
                name: name.to_string(),
                ty,
            });
        }
        Ok(())
    }
}

/// Collect the arguments a positionally-inferred template requires.
///
/// Names referenced inside a field's spec (e.g. `{x:{width}}`) are recorded
/// with type [`ValueType::String`].
///
/// # Errors
/// - [`EtchError::CompoundName`] for a field using `.` or `[` access.
/// - [`EtchError::AnonymousField`] for a field with no name or index.
/// - [`EtchError::MalformedTemplate`] if the template does not parse.
pub fn extract_args(template: &str) -> Result<ArgRequirements, EtchError> {
    let mut reqs = ArgRequirements::default();
    for seg in scan(template)? {
        let Some(raw) = seg.field else { continue };
        let field = Field::from_raw(&raw)?;
        check_simple(&field)?;
        reqs.add(field.base_name(), field.inferred_type())?;

        for nested in field.nested_names() {
            let sub = Field::new(nested.as_str(), "", None)?;
            check_simple(&sub)?;
            reqs.add(sub.base_name(), ValueType::String)?;
        }
    }
    Ok(reqs)
}

/// Infer positional indices, then extract.
pub fn infer_and_extract(template: &str) -> Result<ArgRequirements, EtchError> {
    extract_args(&infer_positional(template))
}

fn check_simple(field: &Field) -> Result<(), EtchError> {
    if field.is_compound() {
        return Err(EtchError::CompoundName {
            name: field.name().to_string(),
        });
    }
    if field.is_anonymous() {
        return Err(EtchError::AnonymousField);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_types_from_spec() {
        let reqs = extract_args("{0}, {1:d}, {2:f}, {1}").unwrap();
        assert_eq!(
            reqs.positional,
            vec![
                PositionalArg { index: 0, ty: ValueType::String },
                PositionalArg { index: 1, ty: ValueType::Integer },
                PositionalArg { index: 2, ty: ValueType::Float },
            ]
        );
        assert!(reqs.keyword.is_empty());
        assert_eq!(reqs.min_positional_len(), 3);
    }

    #[test]
    fn first_type_wins() {
        let reqs = extract_args("{x:d} {x:f}").unwrap();
        assert_eq!(reqs.keyword_type("x"), Some(ValueType::Integer));
        assert_eq!(reqs.keyword.len(), 1);
    }

    #[test]
    fn anonymous_rejected_until_inferred() {
        assert!(matches!(extract_args("{}"), Err(EtchError::AnonymousField)));
        let reqs = infer_and_extract("{} {}").unwrap();
        assert_eq!(reqs.positional.len(), 2);
    }

    #[test]
    fn compound_rejected() {
        assert!(matches!(
            extract_args("{0.attr}"),
            Err(EtchError::CompoundName { name }) if name == "0.attr"
        ));
    }
}
