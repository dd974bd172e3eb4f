//! The fallback renderer.
//!
//! An [`Etcher`] tokenizes its template once and, for every field, computes
//! a default string and a [`Transform`] up front. Rendering formats each
//! field on its own; when a field fails, its precomputed default is used
//! in its place and the rest of the template is unaffected.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::args::{ArgRequirements, infer_and_extract};
use crate::config::{DefaultPolicy, EtchConfig, TransformPolicy};
use crate::error::EtchError;
use crate::eval::{ArgSource, EvalError, Evaluator, StandardEvaluator};
use crate::grammar::field::Field;
use crate::grammar::tokenize::{Token, tokenize};
use crate::value::{Kwargs, Value, kwargs_from_json};

/// Spec given to fields written without one, once their default is known.
const DEFAULT_TYPE_SUFFIX: &str = "s";

/// Post-processing applied to a successfully rendered field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Emit as rendered.
    #[default]
    Verbatim,
    /// Escape `& < > " '` for HTML and XML text.
    Html,
    /// Escape as JSON string content (no surrounding quotes).
    Json,
}

impl Transform {
    /// Apply this transform to rendered text.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Transform::Verbatim => Cow::Borrowed(text),
            Transform::Html => escape_html(text),
            Transform::Json => match serde_json::to_string(text) {
                Ok(quoted) => Cow::Owned(quoted[1..quoted.len() - 1].to_string()),
                Err(_) => Cow::Borrowed(text),
            },
        }
    }
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// A strategy could not produce a value for a field.
///
/// Returning this from a defaulter or transformer leaves the field without
/// a fallback; it is not an error for the build as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no entry for field {field}")]
pub struct LookupError {
    /// Canonical text of the field that was looked up.
    pub field: String,
}

impl LookupError {
    /// A lookup failure for `field`.
    pub fn for_field(field: &Field) -> Self {
        Self {
            field: field.canonical(),
        }
    }
}

/// Result type for defaulter and transformer strategies.
pub type StrategyResult<T> = Result<T, LookupError>;

type Defaulter<'s> = Box<dyn Fn(&Field) -> StrategyResult<String> + 's>;
type Transformer<'s> = Box<dyn Fn(&Field) -> StrategyResult<Transform> + 's>;

/// Position of a field token within an [`Etcher`]'s token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(usize);

impl FieldId {
    /// Index into [`Etcher::tokens`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// How one field came out of a render.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<'a> {
    /// The evaluator formatted the field; transform already applied.
    Rendered(String),
    /// The evaluator failed and the precomputed default was used.
    Defaulted {
        /// The substituted default.
        text: &'a str,
        /// Why the field failed.
        error: EvalError,
    },
    /// The evaluator failed and the field has no default.
    Unrecoverable(EvalError),
}

impl FieldOutcome<'_> {
    /// Text this outcome contributes, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            FieldOutcome::Rendered(s) => Some(s),
            FieldOutcome::Defaulted { text, .. } => Some(text),
            FieldOutcome::Unrecoverable(_) => None,
        }
    }

    /// Whether the default was substituted.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, FieldOutcome::Defaulted { .. })
    }
}

/// Builder for [`Etcher`].
///
/// ```
/// use etch_core::{Etcher, Kwargs, Value};
///
/// let etcher = Etcher::builder("Hello, {name}! You have {count:d} messages.")
///     .defaulter(|_| Ok("?".to_string()))
///     .build()
///     .unwrap();
///
/// let mut kwargs = Kwargs::new();
/// kwargs.insert("name".into(), Value::from("Ada"));
/// assert_eq!(
///     etcher.format(&[], &kwargs).unwrap(),
///     "Hello, Ada! You have ? messages."
/// );
/// ```
pub struct EtcherBuilder<'s, E = StandardEvaluator> {
    template: String,
    config: EtchConfig,
    defaulter: Option<Defaulter<'s>>,
    transformer: Option<Transformer<'s>>,
    evaluator: E,
}

impl<'s> EtcherBuilder<'s> {
    /// Start building a renderer for `template`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            config: EtchConfig::default(),
            defaulter: None,
            transformer: None,
            evaluator: StandardEvaluator,
        }
    }
}

impl<'s, E: Evaluator> EtcherBuilder<'s, E> {
    /// Replace the configuration.
    pub fn config(mut self, config: EtchConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `f` to compute each field's default; sets the policy to custom.
    pub fn defaulter(mut self, f: impl Fn(&Field) -> StrategyResult<String> + 's) -> Self {
        self.defaulter = Some(Box::new(f));
        self.config.default = DefaultPolicy::Custom;
        self
    }

    /// Use `f` to compute each field's transform; sets the policy to custom.
    pub fn transformer(mut self, f: impl Fn(&Field) -> StrategyResult<Transform> + 's) -> Self {
        self.transformer = Some(Box::new(f));
        self.config.transform = TransformPolicy::Custom;
        self
    }

    /// Format fields with `evaluator` instead of [`StandardEvaluator`].
    pub fn evaluator<E2: Evaluator>(self, evaluator: E2) -> EtcherBuilder<'s, E2> {
        EtcherBuilder {
            template: self.template,
            config: self.config,
            defaulter: self.defaulter,
            transformer: self.transformer,
            evaluator,
        }
    }

    /// Tokenize the template and precompute every field's default and transform.
    ///
    /// # Errors
    /// - [`EtchError::Configuration`] if a custom policy has no strategy, or a
    ///   strategy was supplied but the configured policy is not custom.
    /// - [`EtchError::MalformedTemplate`] if the template does not parse.
    pub fn build(self) -> Result<Etcher<E>, EtchError> {
        let defaulter = resolve_defaulter(&self.config.default, self.defaulter)?;
        let transformer = resolve_transformer(&self.config.transform, self.transformer)?;

        let mut tokens = tokenize(&self.template, true)?;
        let mut defaults = BTreeMap::new();
        let mut transforms = BTreeMap::new();

        for (index, token) in tokens.iter_mut().enumerate() {
            let Token::Field(field) = token else { continue };
            let precomputed = defaulter(field).and_then(|d| transformer(field).map(|t| (d, t)));
            match precomputed {
                Ok((default, transform)) => {
                    defaults.insert(FieldId(index), default);
                    transforms.insert(FieldId(index), transform);
                    if field.format_spec().is_empty() {
                        field.set_format_spec(DEFAULT_TYPE_SUFFIX)?;
                    }
                }
                Err(err) => {
                    tracing::trace!(field = %field, %err, "no fallback precomputed for field");
                }
            }
        }

        tracing::debug!(
            template = %self.template,
            tokens = tokens.len(),
            defaults = defaults.len(),
            "built etcher"
        );

        Ok(Etcher {
            raw: self.template,
            tokens,
            defaults,
            transforms,
            evaluator: self.evaluator,
        })
    }
}

fn resolve_defaulter<'s>(
    policy: &DefaultPolicy,
    custom: Option<Defaulter<'s>>,
) -> Result<Defaulter<'s>, EtchError> {
    match (policy, custom) {
        (DefaultPolicy::Custom, Some(f)) => Ok(f),
        (DefaultPolicy::Custom, None) => Err(EtchError::Configuration(
            "default policy is custom but no defaulter was supplied".into(),
        )),
        (_, Some(_)) => Err(EtchError::Configuration(format!(
            "a defaulter was supplied but the default policy is {policy:?}"
        ))),
        (DefaultPolicy::FieldSource, None) => Ok(Box::new(|f: &Field| -> StrategyResult<String> {
            Ok(f.canonical())
        })),
        (DefaultPolicy::Empty, None) => Ok(Box::new(|_: &Field| -> StrategyResult<String> {
            Ok(String::new())
        })),
        (DefaultPolicy::Placeholder(text), None) => {
            let text = text.clone();
            Ok(Box::new(move |_: &Field| -> StrategyResult<String> {
                Ok(text.clone())
            }))
        }
    }
}

fn resolve_transformer<'s>(
    policy: &TransformPolicy,
    custom: Option<Transformer<'s>>,
) -> Result<Transformer<'s>, EtchError> {
    match (policy, custom) {
        (TransformPolicy::Custom, Some(f)) => Ok(f),
        (TransformPolicy::Custom, None) => Err(EtchError::Configuration(
            "transform policy is custom but no transformer was supplied".into(),
        )),
        (TransformPolicy::Fixed(t), None) => {
            let t = *t;
            Ok(Box::new(move |_: &Field| -> StrategyResult<Transform> { Ok(t) }))
        }
        (TransformPolicy::Fixed(_), Some(_)) => Err(EtchError::Configuration(format!(
            "a transformer was supplied but the transform policy is {policy:?}"
        ))),
    }
}

/// A template prepared for fault-tolerant rendering.
///
/// Defaults and transforms are fixed at construction; [`Etcher::format`]
/// only reads them, so one instance can serve many renders, including from
/// several threads at once when the evaluator is `Sync`.
#[derive(Debug, Clone)]
pub struct Etcher<E = StandardEvaluator> {
    raw: String,
    tokens: Vec<Token>,
    defaults: BTreeMap<FieldId, String>,
    transforms: BTreeMap<FieldId, Transform>,
    evaluator: E,
}

impl Etcher {
    /// Build with the default configuration: each field falls back to its
    /// own canonical text and is emitted verbatim.
    pub fn new(template: impl Into<String>) -> Result<Self, EtchError> {
        EtcherBuilder::new(template).build()
    }

    /// Start a builder for `template`.
    pub fn builder<'s>(template: impl Into<String>) -> EtcherBuilder<'s> {
        EtcherBuilder::new(template)
    }
}

impl<E: Evaluator> Etcher<E> {
    /// The template as given.
    pub fn template(&self) -> &str {
        &self.raw
    }

    /// The tokenized, positionally inferred template.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Field tokens with their ids.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_field().map(|f| (FieldId(i), f)))
    }

    /// The precomputed default for a field, if one was computed.
    pub fn default_for(&self, id: FieldId) -> Option<&str> {
        self.defaults.get(&id).map(String::as_str)
    }

    /// The precomputed transform for a field, if one was computed.
    pub fn transform_for(&self, id: FieldId) -> Option<Transform> {
        self.transforms.get(&id).copied()
    }

    /// Arguments this template requires.
    pub fn requirements(&self) -> Result<ArgRequirements, EtchError> {
        infer_and_extract(&self.raw)
    }

    /// Render against positional and keyword arguments.
    ///
    /// # Errors
    /// [`EtchError::Render`] if a field fails and has no default. No partial
    /// output is returned.
    pub fn format(&self, args: &[Value], kwargs: &Kwargs) -> Result<String, EtchError> {
        let mut out = String::with_capacity(self.raw.len());
        for (index, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(field) => {
                    match self.render_field(FieldId(index), field, args, kwargs) {
                        FieldOutcome::Rendered(text) => out.push_str(&text),
                        FieldOutcome::Defaulted { text, .. } => out.push_str(text),
                        FieldOutcome::Unrecoverable(source) => {
                            return Err(EtchError::Render {
                                field: field.canonical(),
                                source,
                            });
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Render with positional arguments only.
    pub fn format_positional(&self, args: &[Value]) -> Result<String, EtchError> {
        self.format(args, &Kwargs::new())
    }

    /// Render with keyword arguments only.
    pub fn format_keywords(&self, kwargs: &Kwargs) -> Result<String, EtchError> {
        self.format(&[], kwargs)
    }

    /// Render with keyword arguments taken from a JSON object.
    pub fn format_json(&self, kwargs: serde_json::Value) -> Result<String, EtchError> {
        self.format(&[], &kwargs_from_json(kwargs))
    }

    /// Render every field and report how each one came out.
    pub fn outcomes(&self, args: &[Value], kwargs: &Kwargs) -> Vec<(FieldId, FieldOutcome<'_>)> {
        self.fields()
            .map(|(id, field)| (id, self.render_field(id, field, args, kwargs)))
            .collect()
    }

    fn render_field(
        &self,
        id: FieldId,
        field: &Field,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> FieldOutcome<'_> {
        let construct = field.canonical();
        let result = if field.is_positional() {
            self.evaluator
                .evaluate(&construct, ArgSource::Positional(args))
        } else {
            let name = field.base_name();
            match kwargs.get(name) {
                Some(value) => {
                    let single = Kwargs::from([(name.to_string(), value.clone())]);
                    self.evaluator
                        .evaluate(&construct, ArgSource::Keyword(&single))
                }
                None => Err(EvalError::MissingKeyword(name.to_string())),
            }
        };

        match result {
            Ok(text) => {
                let transform = self.transform_for(id).unwrap_or_default();
                FieldOutcome::Rendered(transform.apply(&text).into_owned())
            }
            Err(error) => match self.defaults.get(&id) {
                Some(text) => {
                    tracing::debug!(field = %construct, %error, "field fell back to its default");
                    FieldOutcome::Defaulted { text, error }
                }
                None => FieldOutcome::Unrecoverable(error),
            },
        }
    }
}
