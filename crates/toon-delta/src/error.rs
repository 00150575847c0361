//! Error types for token counting, encoding and batch selection.

use std::path::PathBuf;

use thiserror::Error;

use crate::encoding::FormatLabel;

/// Errors that can occur while comparing the cost of two serializations.
///
/// Every variant is scoped to a single input: the [`Selector`](crate::Selector)
/// turns it into a one-line report entry and moves on.
#[derive(Error, Debug)]
pub enum DeltaError {
    /// The tokenizer vocabulary for `model` could not be loaded.
    #[error("tokenizer initialization failed for model '{model}': {message}")]
    TokenizerInit { model: String, message: String },

    /// The tokenizer handle was used after `close()`.
    #[error("tokenizer handle used after close")]
    UseAfterClose,

    /// The input text is not a single JSON value.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An encoder could not serialize a decoded value.
    #[error("{format} encoding error: {message}")]
    Encode { format: FormatLabel, message: String },

    /// A file content source could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout toon-delta.
pub type Result<T> = std::result::Result<T, DeltaError>;
