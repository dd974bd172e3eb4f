//! Etch core library.
//!
//! Fault-tolerant templating over brace format strings. A template is
//! scanned into literal text and `{name!conv:spec}` fields, anonymous
//! fields are given explicit indices, and the arguments a template needs
//! can be listed up front. The [`Etcher`] renderer formats each field on
//! its own, substituting a precomputed default for any field that fails
//! instead of failing the whole render.
//!
//! The main entry points are [`tokenize`], [`infer_positional`],
//! [`extract_args`], and [`Etcher`].

#![warn(missing_docs)]

/// Argument extraction.
pub mod args;
/// Renderer configuration.
pub mod config;
/// Error types.
pub mod error;
/// Formatting evaluator seam and the bundled evaluator.
pub mod eval;
/// Template grammar: scanner, inferencer, field model, tokenizer, emitter.
pub mod grammar;
/// The fallback renderer.
pub mod render;
/// Template argument values.
pub mod value;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Grammar
pub use grammar::emit::emit_template;
pub use grammar::field::{Accessor, Field, ValueType};
pub use grammar::infer::infer_positional;
pub use grammar::tokenize::{Token, split_template, tokenize};

// Arguments
pub use args::{ArgRequirements, KeywordArg, PositionalArg, extract_args, infer_and_extract};

// Rendering
pub use config::{DefaultPolicy, EtchConfig, TransformPolicy};
pub use render::{
    Etcher, EtcherBuilder, FieldId, FieldOutcome, LookupError, StrategyResult, Transform,
};

// Evaluation
pub use eval::{ArgSource, EvalError, Evaluator, StandardEvaluator};
pub use value::{Kwargs, Value};

// Errors
pub use error::EtchError;
