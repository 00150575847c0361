//! # toon-delta
//!
//! Decide, per structured input, whether **TOON** or **JSON** is the cheaper way
//! to hand it to an LLM, measured in real BPE tokens.
//!
//! For each decoded JSON value both serializations are produced, counted with
//! the same tokenizer, and the difference `json_tokens - toon_tokens` becomes
//! the *delta*. TOON is chosen only when the delta is strictly positive.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use toon_delta::{Comparator, FormatLabel, TokenizerHandle, DEFAULT_MODEL};
//!
//! let tokenizer = TokenizerHandle::new(DEFAULT_MODEL);
//! let comparator = Comparator::new(&tokenizer);
//!
//! let users = json!({"users": [
//!     {"id": 1, "name": "Alice", "role": "admin"},
//!     {"id": 2, "name": "Bob", "role": "user"},
//!     {"id": 3, "name": "Carol", "role": "user"},
//! ]});
//! let result = comparator.compare(&users).unwrap();
//! assert!(result.delta > 0);
//! assert_eq!(result.chosen_label(), FormatLabel::Toon);
//! tokenizer.close();
//! ```
//!
//! ## Modules
//!
//! - [`tokenizer`] — BPE token counting and the lazily built tokenizer handle
//! - [`toon`] — TOON writer (compact format)
//! - [`encoding`] — encoder trait, JSON baseline, format labels
//! - [`comparator`] — token delta between the two serializations
//! - [`selector`] — batch policy, report lines, payload entries
//! - [`reference`] — host attachment shapes resolved to batch inputs
//! - [`error`] — error taxonomy

pub mod comparator;
pub mod encoding;
pub mod error;
pub mod reference;
pub mod selector;
pub mod tokenizer;
pub mod toon;

pub use comparator::{Comparator, ComparisonResult};
pub use encoding::{encode_json, encode_toon, FormatLabel, JsonEncoder, ValueEncoder};
pub use error::{DeltaError, Result};
pub use reference::{resolve_all, Reference};
pub use selector::{
    parse_input, BaselinePayload, BatchOutcome, ContentSource, FileReport, InputFilter,
    NamedInput, PayloadEntry, ReportOutcome, Selector, SelectorConfig,
};
pub use tokenizer::{BpeTokenizer, TokenCounter, TokenSequence, TokenizerHandle, DEFAULT_MODEL};
pub use toon::{Delimiter, EncodeOptions, ToonEncoder};
