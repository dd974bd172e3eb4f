/// Emitter: tokens back into template text.
pub mod emit;
/// Replacement field model and value-type inference.
pub mod field;
/// Positional inference for anonymous fields.
pub mod infer;
/// Escape-aware scanner for literal runs and raw fields.
pub mod scanner;
/// Tokenizer: template text into literal and field tokens.
pub mod tokenize;
